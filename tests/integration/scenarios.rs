//! End-to-end scenarios for the classification engine

use std::cell::RefCell;
use std::rc::Rc;

use reflex::storage::HierarchyUpdate;
use reflex::{ComponentFilter, Ecs, EntityId, component};

use crate::init_logging;

#[derive(Debug, PartialEq)]
struct Position(f32);
component!(Position, 1);

#[derive(Debug, PartialEq)]
struct Health(u32);
component!(Health, 2);

// =============================================================================
// Persistent Filters
// =============================================================================

#[test]
fn persistent_list_is_populated_before_any_tick() {
    init_logging();
    let mut ecs = Ecs::new();
    let view = ecs.filter_entities(ComponentFilter::new().have::<Position>());

    let e1 = ecs.spawn();
    ecs.add_component(e1, Position(0.0));
    ecs.add(e1, None);
    assert_eq!(view.to_vec(), vec![e1]);

    ecs.tick().unwrap();
    assert_eq!(view.to_vec(), vec![e1]);
}

#[test]
fn systems_asking_for_the_same_filter_share_one_list() {
    init_logging();
    let mut ecs = Ecs::new();
    let first = ecs.filter_entities(ComponentFilter::new().have::<Position>().changing::<Health>());
    let second = ecs.filter_entities(ComponentFilter::new().have::<Position>().changing::<Health>());

    assert!(first.ptr_eq(&second));
}

// =============================================================================
// One-Tick Latency
// =============================================================================

#[test]
fn in_place_update_is_delivered_exactly_once_a_tick_later() {
    init_logging();
    let mut ecs = Ecs::new();
    let deliveries: Rc<RefCell<Vec<(u64, Vec<EntityId>)>>> = Rc::default();
    let sink = Rc::clone(&deliveries);
    ecs.observe_entities(
        ComponentFilter::new().changing::<Position>(),
        move |ecs, entities| {
            sink.borrow_mut().push((ecs.tick_number(), entities.to_vec()));
            Ok(())
        },
    );

    let e1 = ecs.spawn();
    ecs.add(e1, None);
    ecs.add_component(e1, Health(3));
    ecs.add_component(e1, Position(0.0));
    ecs.tick().unwrap();
    deliveries.borrow_mut().clear();

    ecs.update_component::<Position, _>(e1, |p| p.0 = 1.0).unwrap();
    ecs.tick().unwrap(); // phase 6 queues the match
    ecs.tick().unwrap(); // phase 2 delivers it
    ecs.tick().unwrap();

    assert_eq!(
        *deliveries.borrow(),
        vec![(2, vec![]), (3, vec![e1]), (4, vec![])]
    );
}

#[test]
fn updates_to_unobserved_kinds_do_not_notify() {
    init_logging();
    let mut ecs = Ecs::new();
    let sizes: Rc<RefCell<Vec<usize>>> = Rc::default();
    let sink = Rc::clone(&sizes);
    ecs.observe_entities(ComponentFilter::new().changing::<Position>(), move |_, entities| {
        sink.borrow_mut().push(entities.len());
        Ok(())
    });

    let e = ecs.spawn();
    ecs.add_component(e, Health(1));
    ecs.add_component(e, Position(0.0));
    ecs.add(e, None);
    ecs.tick().unwrap();

    ecs.update_component::<Health, _>(e, |h| h.0 = 0).unwrap();
    ecs.tick().unwrap();
    ecs.tick().unwrap();

    assert_eq!(*sizes.borrow(), vec![1, 0, 0]);
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn hierarchy_updates_arrive_once_in_record_order() {
    init_logging();
    let mut ecs = Ecs::new();
    let batches: Rc<RefCell<Vec<Vec<HierarchyUpdate>>>> = Rc::default();
    let sink = Rc::clone(&batches);
    ecs.observe_hierarchy("default", move |_, updates| {
        sink.borrow_mut().push(updates.to_vec());
        Ok(())
    });

    let root = ecs.spawn();
    let a = ecs.spawn();
    let b = ecs.spawn();
    ecs.add(root, None);
    ecs.add(a, Some(root));
    ecs.add(b, Some(a));

    ecs.tick().unwrap();
    ecs.tick().unwrap();

    assert_eq!(
        *batches.borrow(),
        vec![vec![
            HierarchyUpdate::added(root, None),
            HierarchyUpdate::added(a, Some(root)),
            HierarchyUpdate::added(b, Some(a)),
        ]]
    );
    assert_eq!(ecs.children(Some(root), "default"), &[a]);
}

#[test]
fn relations_are_flushed_in_first_seen_order() {
    init_logging();
    let mut ecs = Ecs::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    for relation in ["ui", "physics"] {
        let order = Rc::clone(&order);
        ecs.observe_hierarchy(relation, move |_, _| {
            order.borrow_mut().push(relation);
            Ok(())
        });
    }

    let e = ecs.spawn();
    ecs.add_to(e, None, "physics");
    ecs.add_to(e, None, "ui");
    ecs.tick().unwrap();

    assert_eq!(*order.borrow(), vec!["ui", "physics"]);
}
