//! Error types for the Reflex runtime.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::component::ComponentKind;
use crate::entity::EntityId;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Reflex operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Replaces the context of this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Records the tick and phase in this error's context, creating it if needed.
    #[must_use]
    pub fn at_tick(mut self, tick: u64, phase: &'static str) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_tick(tick, phase));
        self
    }

    /// Creates a component not found error.
    #[must_use]
    pub fn component_not_found(entity: EntityId, kind: ComponentKind) -> Self {
        Self::new(ErrorKind::ComponentNotFound { entity, kind })
    }

    /// Creates an error raised from inside a user callback.
    #[must_use]
    pub fn callback(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Callback(message.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// `update_component` targeted a kind the entity does not carry.
    #[error("component not found: {kind} on entity {entity:?}")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// The kind that was not found.
        kind: ComponentKind,
    },

    /// `tick()` was called from inside a tick callback.
    #[error("tick called while a tick is already running")]
    ReentrantTick,

    /// A system's state was already borrowed when one of its hooks fired.
    #[error("system busy: {system}")]
    SystemBusy {
        /// The system's name.
        system: String,
    },

    /// Hierarchy updates were recorded for a relation nobody observes.
    ///
    /// Only raised when strict hierarchy delivery is configured.
    #[error("{count} hierarchy update(s) for relation '{relation}' have no subscriber")]
    UndeliveredHierarchyUpdates {
        /// The relation name.
        relation: String,
        /// Number of pending updates.
        count: usize,
    },

    /// The receiving side of a mutation channel has gone away.
    #[error("mutation channel disconnected")]
    ChannelDisconnected,

    /// The mutation channel mailbox is full.
    #[error("mutation channel full")]
    ChannelFull,

    /// Failure reported by a user callback or system hook.
    #[error("callback failed: {0}")]
    Callback(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Tick number during which the error occurred.
    pub tick: Option<u64>,
    /// Tick phase during which the error occurred.
    pub phase: Option<&'static str>,
    /// Call frames, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick number and phase.
    #[must_use]
    pub fn with_tick(mut self, tick: u64, phase: &'static str) -> Self {
        self.tick = Some(tick);
        self.phase = Some(phase);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tick) = self.tick {
            write!(f, "during tick {tick}")?;
            if let Some(phase) = self.phase {
                write!(f, " ({phase})")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
