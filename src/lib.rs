//! Reflex - Reactive entity-component-system runtime
//!
//! This crate re-exports all layers of the Reflex system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: reflex_std         - Transform components, Animator system
//! Layer 2: reflex_engine      - Filters, observers, persistent filters, tick, systems, channels
//! Layer 1: reflex_storage     - Entity tracking, component store, hierarchy
//! Layer 0: reflex_foundation  - Core types (EntityId, ComponentKind, Error)
//! ```

pub use reflex_engine as engine;
pub use reflex_foundation as foundation;
pub use reflex_std as std_systems;
pub use reflex_storage as storage;

pub use reflex_engine::{ComponentFilter, Ecs, EcsConfig, FilterView, System, SystemContext};
pub use reflex_foundation::{Component, ComponentKind, EntityId, Error, ErrorKind, Result, component};
