//! Runtime configuration.

/// Configuration for an [`Ecs`](crate::Ecs).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcsConfig {
    /// Name of the relation used by [`Ecs::add`](crate::Ecs::add).
    pub default_relation: String,

    /// Fail the tick when a relation has pending updates but no subscriber.
    ///
    /// When false, such updates are logged at `warn` and discarded.
    pub strict_hierarchy_delivery: bool,

    /// Log each tick phase at `trace` level.
    pub trace_phases: bool,

    /// Capacity of the cross-thread mutation mailbox (`None` = unbounded).
    pub channel_capacity: Option<usize>,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            default_relation: "default".to_string(),
            strict_hierarchy_delivery: false,
            trace_phases: false,
            channel_capacity: None,
        }
    }
}

impl EcsConfig {
    /// Creates a configuration that treats undelivered hierarchy updates as errors.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_hierarchy_delivery: true,
            ..Self::default()
        }
    }

    /// Creates a configuration for debugging: strict delivery and phase tracing.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            strict_hierarchy_delivery: true,
            trace_phases: true,
            ..Self::default()
        }
    }

    /// Builder method to set the default relation name.
    #[must_use]
    pub fn with_default_relation(mut self, name: impl Into<String>) -> Self {
        self.default_relation = name.into();
        self
    }

    /// Builder method to enable/disable strict hierarchy delivery.
    #[must_use]
    pub fn with_strict_hierarchy_delivery(mut self, strict: bool) -> Self {
        self.strict_hierarchy_delivery = strict;
        self
    }

    /// Builder method to enable/disable phase tracing.
    #[must_use]
    pub fn with_trace_phases(mut self, trace: bool) -> Self {
        self.trace_phases = trace;
        self
    }

    /// Builder method to bound the mutation mailbox.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: Option<usize>) -> Self {
        self.channel_capacity = capacity;
        self
    }
}
