//! Integration tests for per-tick observers

use std::cell::RefCell;
use std::rc::Rc;

use reflex_engine::{ComponentFilter, Ecs};
use reflex_foundation::EntityId;

use crate::{Frozen, Position, Velocity};

type Deliveries = Rc<RefCell<Vec<Vec<EntityId>>>>;

fn record(ecs: &mut Ecs, filter: ComponentFilter) -> Deliveries {
    let deliveries: Deliveries = Rc::default();
    let sink = Rc::clone(&deliveries);
    ecs.observe_entities(filter, move |_, entities| {
        sink.borrow_mut().push(entities.to_vec());
        Ok(())
    });
    deliveries
}

// =============================================================================
// Delivery
// =============================================================================

#[test]
fn observer_receives_matches_at_next_tick() {
    let mut ecs = Ecs::new();
    let deliveries = record(&mut ecs, ComponentFilter::new().have::<Position>());

    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.add(e, None);
    assert!(deliveries.borrow().is_empty());

    ecs.tick().unwrap();
    assert_eq!(*deliveries.borrow(), vec![vec![e]]);

    ecs.tick().unwrap();
    assert_eq!(*deliveries.borrow(), vec![vec![e], vec![]]);
}

#[test]
fn repeated_matches_are_not_deduplicated() {
    let mut ecs = Ecs::new();
    let deliveries = record(&mut ecs, ComponentFilter::new().changing::<Position>());

    let e = ecs.spawn();
    ecs.add(e, None);
    ecs.add_component(e, Position(0));
    ecs.add_component(e, Position(1));
    ecs.tick().unwrap();

    assert_eq!(*deliveries.borrow(), vec![vec![e, e]]);
}

#[test]
fn adding_a_kind_is_classified_before_it_is_attached() {
    let mut ecs = Ecs::new();
    let deliveries = record(
        &mut ecs,
        ComponentFilter::new().have::<Velocity>().changing::<Velocity>(),
    );

    let e = ecs.spawn();
    ecs.add(e, None);
    ecs.add_component(e, Velocity(1));
    ecs.tick().unwrap();

    assert_eq!(*deliveries.borrow(), vec![Vec::<EntityId>::new()]);
}

#[test]
fn every_subscriber_of_a_filter_gets_the_same_list() {
    let mut ecs = Ecs::new();
    let first = record(&mut ecs, ComponentFilter::new().have::<Position>().have::<Velocity>());
    let second = record(&mut ecs, ComponentFilter::new().have::<Velocity>().have::<Position>());

    let e = ecs.spawn();
    ecs.add_component(e, Velocity(1));
    ecs.add_component(e, Position(1));
    ecs.add(e, None);
    ecs.tick().unwrap();

    assert_eq!(*first.borrow(), vec![vec![e]]);
    assert_eq!(*second.borrow(), *first.borrow());
}

#[test]
fn observers_fire_in_filter_registration_order() {
    let mut ecs = Ecs::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    for (name, filter) in [
        ("frozen", ComponentFilter::new().have::<Frozen>()),
        ("position", ComponentFilter::new().have::<Position>()),
    ] {
        let order = Rc::clone(&order);
        ecs.observe_entities(filter, move |_, _| {
            order.borrow_mut().push(name);
            Ok(())
        });
    }

    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.add_component(e, Frozen);
    ecs.add(e, None);
    ecs.tick().unwrap();

    assert_eq!(*order.borrow(), vec!["frozen", "position"]);
}

#[test]
fn untracked_entities_are_never_observed() {
    let mut ecs = Ecs::new();
    let deliveries = record(&mut ecs, ComponentFilter::new());

    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.update_component::<Position, _>(e, |p| p.0 = 3).unwrap();
    ecs.tick().unwrap();
    ecs.tick().unwrap();

    assert_eq!(*deliveries.borrow(), vec![Vec::<EntityId>::new(); 2]);
    assert_eq!(ecs.get_component::<Position>(e), Some(&Position(3)));
}

// =============================================================================
// Hierarchy Observers
// =============================================================================

#[test]
fn hierarchy_subscribers_receive_their_relation_only() {
    let mut ecs = Ecs::new();
    let scene = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&scene);
    ecs.observe_hierarchy("scene", move |_, updates| {
        sink.borrow_mut().extend_from_slice(updates);
        Ok(())
    });

    let root = ecs.spawn();
    let child = ecs.spawn();
    ecs.add(root, None);
    ecs.add_to(root, None, "scene");
    ecs.add_to(child, Some(root), "scene");
    let report = ecs.tick().unwrap();

    let entities: Vec<_> = scene.borrow().iter().map(|u| (u.entity, u.parent)).collect();
    assert_eq!(entities, vec![(root, None), (child, Some(root))]);
    assert_eq!(report.hierarchy_updates, 2);
    assert_eq!(report.undelivered_updates, 1);
}
