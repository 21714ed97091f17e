//! Standard components and systems for Reflex.
//!
//! This crate provides:
//! - [`Position`], [`Rotation`], [`Scale`], [`RotationSpeed`] - Transform components
//! - [`Animator`] - Advances rotations by their speed every tick

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod animator;
pub mod transform;

pub use animator::Animator;
pub use transform::{Position, Rotation, RotationSpeed, Scale};
