//! Integration tests for mutation channels

use std::sync::mpsc;
use std::thread;

use reflex_engine::{Channel, ComponentFilter, Ecs, EcsConfig};
use reflex_foundation::ErrorKind;

use crate::{Position, Velocity};

#[test]
fn default_channel_is_a_pass_through() {
    let mut ecs = Ecs::new();
    let e = ecs.spawn();

    let mut channel = ecs.default_channel();
    channel.add_component(e, Position(1)).unwrap();
    channel
        .update_component::<Position, _>(e, |p| p.0 *= 10)
        .unwrap();
    assert_eq!(channel.get_component::<Position>(e), Some(&Position(10)));
}

#[test]
fn generic_code_can_target_any_channel() {
    fn spawn_body<C: Channel>(channel: &mut C, entity: reflex_foundation::EntityId) {
        channel.add_component(entity, Position(0)).unwrap();
        channel.add_component(entity, Velocity(1)).unwrap();
    }

    let mut ecs = Ecs::new();
    let direct = ecs.spawn();
    let queued = ecs.spawn();

    spawn_body(&mut ecs.default_channel(), direct);
    let mut sender = ecs.channel_sender();
    spawn_body(&mut sender, queued);

    assert_eq!(ecs.components(direct).len(), 2);
    assert!(ecs.components(queued).is_empty());

    assert_eq!(ecs.receive_mutations().unwrap(), 2);
    assert_eq!(ecs.components(queued).len(), 2);
}

#[test]
fn worker_threads_feed_the_owning_thread() {
    let mut ecs = Ecs::new();
    let view = ecs.filter_entities(ComponentFilter::new().have::<Position>());
    let entities: Vec<_> = (0..4).map(|_| ecs.spawn()).collect();

    let (done_tx, done_rx) = mpsc::channel();
    for &entity in &entities {
        let sender = ecs.channel_sender();
        let done = done_tx.clone();
        thread::spawn(move || {
            sender
                .send(move |ecs| {
                    ecs.add_component(entity, Position(0));
                    ecs.add(entity, None);
                    Ok(())
                })
                .unwrap();
            done.send(()).unwrap();
        });
    }
    drop(done_tx);
    assert_eq!(done_rx.iter().count(), entities.len());

    assert_eq!(ecs.receive_mutations().unwrap(), entities.len());
    let mut tracked = view.to_vec();
    tracked.sort();
    assert_eq!(tracked, entities);
}

#[test]
fn queued_updates_of_missing_components_fail_on_receive() {
    let mut ecs = Ecs::new();
    let e = ecs.spawn();
    let mut sender = ecs.channel_sender();

    sender
        .update_component::<Velocity, _>(e, |v| v.0 = 1)
        .unwrap();
    let err = ecs.receive_mutations().unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ComponentNotFound { .. }));
}

#[test]
fn bounded_mailbox_rejects_overflow() {
    let mut ecs = Ecs::with_config(EcsConfig::default().with_channel_capacity(Some(2)));
    let e = ecs.spawn();
    let mut sender = ecs.channel_sender();

    sender.add_component(e, Position(0)).unwrap();
    sender.add_component(e, Position(1)).unwrap();
    let err = sender.add_component(e, Position(2)).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::ChannelFull));
    assert_eq!(ecs.receive_mutations().unwrap(), 2);
}
