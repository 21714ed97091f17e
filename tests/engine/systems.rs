//! Integration tests for system registration

use reflex_engine::{ComponentFilter, Ecs, FilterView, System, SystemContext};
use reflex_foundation::{EntityId, Error, ErrorKind, Result};
use reflex_storage::HierarchyUpdate;

use crate::{Position, Velocity};

// =============================================================================
// Test Systems
// =============================================================================

/// Mirrors hierarchy attachments and counts moved entities.
#[derive(Default)]
struct SceneTracker {
    attached: Vec<(EntityId, Option<EntityId>)>,
    moved: usize,
    positioned: Option<FilterView>,
}

impl SceneTracker {
    fn on_hierarchy(&mut self, _ecs: &mut Ecs, updates: &[HierarchyUpdate]) -> Result<()> {
        self.attached
            .extend(updates.iter().map(|update| (update.entity, update.parent)));
        Ok(())
    }

    fn on_moved(&mut self, _ecs: &mut Ecs, entities: &[EntityId]) -> Result<()> {
        self.moved += entities.len();
        Ok(())
    }
}

impl System for SceneTracker {
    fn init(&mut self, ctx: &mut SystemContext<'_, Self>) -> Result<()> {
        self.positioned = Some(ctx.filter_entities(ComponentFilter::new().have::<Position>()));
        ctx.observe_hierarchy("scene", Self::on_hierarchy);
        ctx.observe_entities(ComponentFilter::new().changing::<Position>(), Self::on_moved);
        Ok(())
    }
}

/// Integrates velocity into position every tick.
struct Integrator {
    bodies: FilterView,
}

impl System for Integrator {
    fn init(&mut self, ctx: &mut SystemContext<'_, Self>) -> Result<()> {
        self.bodies = ctx.filter_entities(
            ComponentFilter::new().have::<Position>().have::<Velocity>(),
        );
        ctx.on_tick(|this: &mut Self, ecs: &mut Ecs| {
            for body in this.bodies.to_vec() {
                let Some(&Velocity(v)) = ecs.get_component::<Velocity>(body) else {
                    continue;
                };
                ecs.update_component::<Position, _>(body, |p| p.0 += v)?;
            }
            Ok(())
        });
        Ok(())
    }
}

/// Fails in `init` after staging hooks and a persistent filter.
struct Faulty;

impl System for Faulty {
    fn init(&mut self, ctx: &mut SystemContext<'_, Self>) -> Result<()> {
        ctx.filter_entities(ComponentFilter::new().have::<Velocity>());
        ctx.on_tick(|_, _| Err(Error::callback("must never run")));
        ctx.observe_entities(ComponentFilter::new(), |_, _, _| {
            Err(Error::callback("must never run"))
        });
        Err(Error::callback("configuration missing"))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn system_hooks_see_their_own_state() {
    let mut ecs = Ecs::new();
    let tracker = ecs.register_system(SceneTracker::default()).unwrap();

    let root = ecs.spawn();
    let child = ecs.spawn();
    ecs.add_component(child, Position(0));
    ecs.add_to(root, None, "scene");
    ecs.add_to(child, Some(root), "scene");
    ecs.tick().unwrap();

    let state = tracker.borrow();
    assert_eq!(state.attached, vec![(root, None), (child, Some(root))]);
    assert_eq!(state.moved, 1);
    assert_eq!(state.positioned.as_ref().unwrap().to_vec(), vec![child]);
}

#[test]
fn tick_systems_mutate_through_the_ecs() {
    let mut ecs = Ecs::new();
    let tracker = ecs.register_system(SceneTracker::default()).unwrap();
    ecs.register_system(Integrator {
        bodies: FilterView::default(),
    })
    .unwrap();

    let body = ecs.spawn();
    ecs.add_component(body, Position(0));
    ecs.add_component(body, Velocity(2));
    ecs.add_to(body, None, "scene");

    // Tick 1 delivers the arrival; the integrator's update is seen in tick 2.
    ecs.tick().unwrap();
    assert_eq!(tracker.borrow().moved, 1);
    ecs.tick().unwrap();
    assert_eq!(tracker.borrow().moved, 2);

    assert_eq!(ecs.get_component::<Position>(body), Some(&Position(4)));
    assert_eq!(ecs.systems(), &["SceneTracker", "Integrator"]);
}

#[test]
fn failed_init_leaves_the_system_unregistered() {
    let mut ecs = Ecs::new();
    let result = ecs.register_system(Faulty);

    let err = result.err().expect("init must fail");
    assert!(matches!(err.kind, ErrorKind::Callback(_)));
    assert!(
        err.context
            .unwrap()
            .stack
            .iter()
            .any(|frame| frame.contains("Faulty"))
    );

    let e = ecs.spawn();
    ecs.add_component(e, Velocity(1));
    ecs.add(e, None);
    let report = ecs.tick().unwrap();
    assert_eq!(report.tick_callbacks, 0);
    assert_eq!(report.observer_notifications, 0);
    assert!(ecs.systems().is_empty());

    // A registered list would already hold `e`; this one is created fresh.
    assert!(ecs.filter_entities(ComponentFilter::new().have::<Velocity>()).is_empty());
}

#[test]
fn system_handle_allows_access_between_ticks() {
    let mut ecs = Ecs::new();
    let tracker = ecs.register_system(SceneTracker::default()).unwrap();

    tracker.borrow_mut().moved = 10;
    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.add(e, None);
    ecs.tick().unwrap();

    assert_eq!(tracker.borrow().moved, 11);
}
