//! Core identifiers, component kinds, and error types for Reflex.
//!
//! This crate provides:
//! - [`EntityId`] - Opaque entity identities
//! - [`Component`] / [`ComponentKind`] - Tagged component values
//! - [`RelationId`] / [`Interner`] - Interned hierarchy relation names
//! - [`Error`] - Categorized error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod error;
pub mod intern;

pub use component::{AnyComponent, Component, ComponentKind};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use intern::{Interner, RelationId};
