//! Classification engine, observers, tick scheduling, and systems for Reflex.
//!
//! This crate provides:
//! - [`ComponentFilter`] - `must_have` / `can_change` predicates
//! - [`ObserverRegistry`] - Per-tick match lists and their subscribers
//! - [`PersistentFilterRegistry`] / [`FilterView`] - Cumulative, once-classified lists
//! - [`Ecs`] - The owning instance and its six-phase [`tick`](Ecs::tick)
//! - [`System`] - Units of behaviour registered through a [`SystemContext`]
//! - [`Channel`] - Routing of mutations into the owning thread

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod channel;
pub mod config;
pub mod ecs;
pub mod filter;
pub mod observer;
pub mod persistent;
pub mod system;
pub mod tick;

pub use channel::{Channel, ChannelSender, Mutation, SameThreadChannel};
pub use config::EcsConfig;
pub use ecs::{Ecs, HierarchyFn, ObserverFn, TickFn};
pub use filter::ComponentFilter;
pub use observer::{HierarchySubscribers, Observation, ObserverRegistry, Subscriber};
pub use persistent::{FilterView, PersistentFilterRegistry};
pub use system::{System, SystemContext, SystemHandle};
pub use tick::{TickPhase, TickReport};
