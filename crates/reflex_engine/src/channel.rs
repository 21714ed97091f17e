//! Mutation channels.
//!
//! A [`Channel`] is the seam through which component mutations reach the
//! store. [`SameThreadChannel`] applies them directly. [`ChannelSender`] can
//! be moved to other threads: it enqueues each mutation into the ECS's
//! mailbox, and the thread that owns the [`Ecs`] applies them with
//! [`Ecs::receive_mutations`], each exactly once and in send order.
//!
//! A foreign thread never touches the store; it only ships closures.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError, TrySendError};

use reflex_foundation::{Component, EntityId, Error, ErrorKind, Result};

use crate::ecs::Ecs;

/// A queued mutation, applied on the thread owning the [`Ecs`].
pub type Mutation = Box<dyn FnOnce(&mut Ecs) -> Result<()> + Send>;

// =============================================================================
// Channel trait
// =============================================================================

/// Routes component mutations into an [`Ecs`].
///
/// Payloads must be `Send` because an implementation may cross a thread
/// boundary before the mutation is applied.
pub trait Channel {
    /// Appends a component to an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation cannot be delivered.
    fn add_component<C: Component + Send>(&mut self, entity: EntityId, component: C)
    -> Result<()>;

    /// Mutates the first component of type `C` on an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation cannot be delivered or, for channels
    /// that apply synchronously, if the entity has no such component.
    fn update_component<C, F>(&mut self, entity: EntityId, mutator: F) -> Result<()>
    where
        C: Component,
        F: FnOnce(&mut C) + Send + 'static;
}

// =============================================================================
// Same-thread channel
// =============================================================================

/// Pass-through channel over a borrowed [`Ecs`].
#[derive(Debug)]
pub struct SameThreadChannel<'a> {
    ecs: &'a mut Ecs,
}

impl<'a> SameThreadChannel<'a> {
    /// Wraps an ECS.
    pub fn new(ecs: &'a mut Ecs) -> Self {
        Self { ecs }
    }

    /// Returns the first component of type `C` on an entity.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: EntityId) -> Option<&C> {
        self.ecs.get_component::<C>(entity)
    }
}

impl Channel for SameThreadChannel<'_> {
    fn add_component<C: Component + Send>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<()> {
        self.ecs.add_component(entity, component);
        Ok(())
    }

    fn update_component<C, F>(&mut self, entity: EntityId, mutator: F) -> Result<()>
    where
        C: Component,
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.ecs.update_component::<C, F>(entity, mutator)
    }
}

// =============================================================================
// Cross-thread channel
// =============================================================================

#[derive(Clone, Debug)]
enum Outbox {
    Unbounded(Sender<Mutation>),
    Bounded(SyncSender<Mutation>),
}

/// Sending half of an ECS mailbox. Cheap to clone, `Send`.
#[derive(Clone, Debug)]
pub struct ChannelSender {
    outbox: Outbox,
}

impl ChannelSender {
    /// Enqueues an arbitrary mutation.
    ///
    /// # Errors
    ///
    /// Returns `ChannelDisconnected` if the ECS has been dropped, or
    /// `ChannelFull` if the mailbox is bounded and full.
    pub fn send<F>(&self, mutation: F) -> Result<()>
    where
        F: FnOnce(&mut Ecs) -> Result<()> + Send + 'static,
    {
        let mutation: Mutation = Box::new(mutation);
        match &self.outbox {
            Outbox::Unbounded(tx) => tx
                .send(mutation)
                .map_err(|_| Error::new(ErrorKind::ChannelDisconnected)),
            Outbox::Bounded(tx) => tx.try_send(mutation).map_err(|e| match e {
                TrySendError::Full(_) => Error::new(ErrorKind::ChannelFull),
                TrySendError::Disconnected(_) => Error::new(ErrorKind::ChannelDisconnected),
            }),
        }
    }
}

impl Channel for ChannelSender {
    fn add_component<C: Component + Send>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<()> {
        self.send(move |ecs| {
            ecs.add_component(entity, component);
            Ok(())
        })
    }

    fn update_component<C, F>(&mut self, entity: EntityId, mutator: F) -> Result<()>
    where
        C: Component,
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.send(move |ecs| ecs.update_component::<C, F>(entity, mutator))
    }
}

/// Receiving half, owned by the [`Ecs`].
#[derive(Debug)]
pub(crate) struct Mailbox {
    outbox: Outbox,
    inbox: Receiver<Mutation>,
}

impl Mailbox {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        match capacity {
            Some(bound) => {
                let (tx, rx) = mpsc::sync_channel(bound);
                Self {
                    outbox: Outbox::Bounded(tx),
                    inbox: rx,
                }
            }
            None => {
                let (tx, rx) = mpsc::channel();
                Self {
                    outbox: Outbox::Unbounded(tx),
                    inbox: rx,
                }
            }
        }
    }

    fn sender(&self) -> ChannelSender {
        ChannelSender {
            outbox: self.outbox.clone(),
        }
    }

    fn next(&self) -> Option<Mutation> {
        match self.inbox.try_recv() {
            Ok(mutation) => Some(mutation),
            // The mailbox holds a sender itself, so it never disconnects.
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

// =============================================================================
// Ecs entry points
// =============================================================================

impl Ecs {
    /// Returns a pass-through channel over this ECS.
    pub fn default_channel(&mut self) -> SameThreadChannel<'_> {
        SameThreadChannel::new(self)
    }

    /// Returns a sender that other threads can use to queue mutations.
    ///
    /// The mailbox is created on first use, bounded by
    /// [`EcsConfig::channel_capacity`](crate::EcsConfig::channel_capacity).
    pub fn channel_sender(&mut self) -> ChannelSender {
        let capacity = self.config.channel_capacity;
        self.mailbox
            .get_or_insert_with(|| Mailbox::new(capacity))
            .sender()
    }

    /// Applies every queued mutation, in send order.
    ///
    /// Returns the number of mutations applied.
    ///
    /// # Errors
    ///
    /// Stops at the first failing mutation and returns its error; mutations
    /// queued behind it stay in the mailbox for the next call.
    pub fn receive_mutations(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Some(mutation) = self.mailbox.as_ref().and_then(Mailbox::next) {
            mutation(self).map_err(|e| e.with_frame("channel mutation"))?;
            applied += 1;
        }
        if applied > 0 {
            log::debug!("applied {applied} channel mutation(s)");
        }
        Ok(applied)
    }
}
