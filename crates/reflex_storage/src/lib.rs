//! Entity tracking, component storage, and relation hierarchies for Reflex.
//!
//! This crate provides:
//! - [`EntityStore`] - Entity allocation and the tracked set
//! - [`ComponentStore`] - Per-entity ordered component sequences
//! - [`ChangeSet`] - Change descriptors fed to the classifier
//! - [`HierarchyStore`] - Per-relation parent/child edges and pending-update queues

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod change;
pub mod component;
pub mod entity;
pub mod hierarchy;

pub use change::ChangeSet;
pub use component::ComponentStore;
pub use entity::EntityStore;
pub use hierarchy::{HierarchyOp, HierarchyStore, HierarchyUpdate};
