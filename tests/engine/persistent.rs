//! Integration tests for persistent filters

use reflex_engine::{ComponentFilter, Ecs};

use crate::{Frozen, Position, Velocity};

#[test]
fn list_is_filled_at_tracking_time() {
    let mut ecs = Ecs::new();
    let view = ecs.filter_entities(ComponentFilter::new().have::<Position>());

    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.add(e, None);

    assert_eq!(view.to_vec(), vec![e]);
    assert_eq!(ecs.tick_number(), 0);
}

#[test]
fn membership_is_frozen_after_first_classification() {
    let mut ecs = Ecs::new();
    let moving = ecs.filter_entities(ComponentFilter::new().have::<Velocity>());

    let late = ecs.spawn();
    ecs.add(late, None);
    ecs.add_component(late, Velocity(1));
    ecs.update_component::<Velocity, _>(late, |v| v.0 = 2).unwrap();
    ecs.tick().unwrap();
    ecs.tick().unwrap();

    assert!(!moving.contains(late));
}

#[test]
fn entity_joins_each_list_once() {
    let mut ecs = Ecs::new();
    let all = ecs.filter_entities(ComponentFilter::new());

    let e = ecs.spawn();
    ecs.add(e, None);
    ecs.add(e, None);
    ecs.add_to(e, None, "physics");

    assert_eq!(all.len(), 1);
}

#[test]
fn identical_filters_share_the_list() {
    let mut ecs = Ecs::new();
    let a = ecs.filter_entities(ComponentFilter::new().have::<Position>().changing::<Frozen>());
    let b = ecs.filter_entities(ComponentFilter::new().changing::<Frozen>().have::<Position>());
    let c = ecs.filter_entities(ComponentFilter::new().have::<Position>());

    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
}

#[test]
fn lists_created_later_start_empty() {
    let mut ecs = Ecs::new();
    let e = ecs.spawn();
    ecs.add_component(e, Position(0));
    ecs.add(e, None);

    let view = ecs.filter_entities(ComponentFilter::new().have::<Position>());
    assert!(view.is_empty());
}

#[test]
fn can_change_is_checked_against_the_buffered_components() {
    let mut ecs = Ecs::new();
    let frozen_on_arrival =
        ecs.filter_entities(ComponentFilter::new().changing::<Frozen>());

    let plain = ecs.spawn();
    ecs.add_component(plain, Position(0));
    ecs.add(plain, None);

    let frozen = ecs.spawn();
    ecs.add_component(frozen, Frozen);
    ecs.add(frozen, None);

    assert_eq!(frozen_on_arrival.to_vec(), vec![frozen]);
}
