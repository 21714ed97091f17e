//! Tick orchestration for Reflex.
//!
//! A tick runs six phases, always in this order:
//! 1. Deliver pending hierarchy updates, per relation
//! 2. Hand each observer the entities it matched since the last tick, even none
//! 3. Run tick callbacks
//! 4. Retire the observer match lists delivered in phase 2
//! 5. Retire the hierarchy updates delivered in phase 1
//! 6. Reclassify entities whose components were updated in place
//!
//! Phases 1 and 2 work on snapshots taken as they start. Anything a callback
//! causes while the tick runs (new matches, hierarchy updates, queued
//! reclassifications) lands in fresh queues and is delivered by the next
//! tick. Mutation visibility is therefore delayed by exactly one tick.
//!
//! A failing callback aborts the tick: the error is returned with the tick
//! number and phase, and the remaining phases do not run.

use std::fmt;

use reflex_foundation::{EntityId, Error, ErrorKind, RelationId, Result};
use reflex_storage::HierarchyUpdate;

use crate::ecs::Ecs;

// =============================================================================
// Tick Phase
// =============================================================================

/// The six phases of a tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Deliver pending hierarchy updates.
    FlushHierarchy,
    /// Notify observers of their matches.
    NotifyObservers,
    /// Run tick callbacks.
    RunTickCallbacks,
    /// Clear observer match lists.
    ClearObservers,
    /// Clear hierarchy update queues.
    ClearHierarchy,
    /// Reclassify updated entities.
    Reclassify,
}

impl TickPhase {
    /// Every phase, in execution order.
    pub const ALL: [TickPhase; 6] = [
        TickPhase::FlushHierarchy,
        TickPhase::NotifyObservers,
        TickPhase::RunTickCallbacks,
        TickPhase::ClearObservers,
        TickPhase::ClearHierarchy,
        TickPhase::Reclassify,
    ];

    /// Returns the phase name used in logs and error contexts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TickPhase::FlushHierarchy => "flush-hierarchy",
            TickPhase::NotifyObservers => "notify-observers",
            TickPhase::RunTickCallbacks => "run-tick-callbacks",
            TickPhase::ClearObservers => "clear-observers",
            TickPhase::ClearHierarchy => "clear-hierarchy",
            TickPhase::Reclassify => "reclassify",
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tick Report
// =============================================================================

/// Counts gathered while running a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The tick number (1 for the first tick).
    pub tick: u64,
    /// Hierarchy updates handed to subscribers.
    pub hierarchy_updates: usize,
    /// Hierarchy updates dropped because their relation had no subscriber.
    pub undelivered_updates: usize,
    /// Observer subscriber invocations.
    pub observer_notifications: usize,
    /// Entity matches retired after delivery (an entity counts once per match).
    pub observed_entities: usize,
    /// Tick callbacks run.
    pub tick_callbacks: usize,
    /// Queued classifications applied in the reclassify phase.
    pub reclassified: usize,
}

type Delivered = Vec<(RelationId, Vec<HierarchyUpdate>)>;

// =============================================================================
// Tick Execution
// =============================================================================

impl Ecs {
    /// Returns the number of ticks started so far.
    #[must_use]
    pub fn tick_number(&self) -> u64 {
        self.tick_number
    }

    /// Returns true while a tick is running.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.in_tick
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Returns `ReentrantTick` if called from inside a tick, or the first
    /// callback error, annotated with the tick number and phase. A failed
    /// tick is not rolled back.
    pub fn tick(&mut self) -> Result<TickReport> {
        if self.in_tick {
            return Err(Error::new(ErrorKind::ReentrantTick));
        }
        self.in_tick = true;
        self.tick_number += 1;
        let tick = self.tick_number;

        let result = self.run_phases(tick);
        self.in_tick = false;

        match &result {
            Ok(report) => log::debug!("tick {tick} complete: {report:?}"),
            Err(err) => log::error!("tick {tick} aborted: {err}"),
        }
        result
    }

    fn run_phases(&mut self, tick: u64) -> Result<TickReport> {
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        self.enter(TickPhase::FlushHierarchy);
        let delivered = self.hierarchy.take_pending();
        self.flush_hierarchy(&delivered, &mut report)
            .map_err(|e| e.at_tick(tick, TickPhase::FlushHierarchy.as_str()))?;

        self.enter(TickPhase::NotifyObservers);
        let matches = self.observers.take_matches();
        self.notify_observers(&matches, &mut report)
            .map_err(|e| e.at_tick(tick, TickPhase::NotifyObservers.as_str()))?;

        self.enter(TickPhase::RunTickCallbacks);
        self.run_tick_callbacks(&mut report)
            .map_err(|e| e.at_tick(tick, TickPhase::RunTickCallbacks.as_str()))?;

        self.enter(TickPhase::ClearObservers);
        report.observed_entities = matches.iter().map(Vec::len).sum();
        drop(matches);

        self.enter(TickPhase::ClearHierarchy);
        let retired: usize = delivered.iter().map(|(_, updates)| updates.len()).sum();
        drop(delivered);
        log::trace!("retired {retired} hierarchy update(s)");

        self.enter(TickPhase::Reclassify);
        report.reclassified = self.reclassify();

        Ok(report)
    }

    fn enter(&self, phase: TickPhase) {
        if self.config.trace_phases {
            log::trace!("tick {}: {phase}", self.tick_number);
        }
    }

    fn relation_label(&self, relation: RelationId) -> String {
        self.relations
            .resolve(relation)
            .map_or_else(|| format!("{relation:?}"), str::to_string)
    }

    fn flush_hierarchy(&mut self, delivered: &Delivered, report: &mut TickReport) -> Result<()> {
        for (relation, updates) in delivered {
            let mut subscribers = self.hierarchy_observers.take(*relation);
            if subscribers.is_empty() {
                let name = self.relation_label(*relation);
                if self.config.strict_hierarchy_delivery {
                    return Err(Error::new(ErrorKind::UndeliveredHierarchyUpdates {
                        relation: name,
                        count: updates.len(),
                    }));
                }
                log::warn!(
                    "{} hierarchy update(s) for relation '{name}' have no subscriber; skipped",
                    updates.len()
                );
                report.undelivered_updates += updates.len();
                continue;
            }

            let outcome = subscribers.iter_mut().try_for_each(|subscriber| {
                (subscriber.callback)(self, updates.as_slice())
                    .map_err(|e| e.with_frame(subscriber.label.clone()))
            });
            self.hierarchy_observers.restore(*relation, subscribers);
            outcome?;
            report.hierarchy_updates += updates.len();
        }
        Ok(())
    }

    fn notify_observers(
        &mut self,
        matches: &[Vec<EntityId>],
        report: &mut TickReport,
    ) -> Result<()> {
        for (slot, entities) in matches.iter().enumerate() {
            let mut subscribers = self.observers.take_subscribers(slot);
            let outcome = subscribers.iter_mut().try_for_each(|subscriber| {
                report.observer_notifications += 1;
                (subscriber.callback)(self, entities.as_slice())
                    .map_err(|e| e.with_frame(subscriber.label.clone()))
            });
            self.observers.restore_subscribers(slot, subscribers);
            outcome?;
        }
        Ok(())
    }

    fn run_tick_callbacks(&mut self, report: &mut TickReport) -> Result<()> {
        let mut callbacks = std::mem::take(&mut self.tick_callbacks);
        let outcome = callbacks.iter_mut().try_for_each(|subscriber| {
            report.tick_callbacks += 1;
            (subscriber.callback)(self).map_err(|e| e.with_frame(subscriber.label.clone()))
        });
        let registered = std::mem::replace(&mut self.tick_callbacks, callbacks);
        self.tick_callbacks.extend(registered);
        outcome
    }

    fn reclassify(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        for item in &pending {
            self.classify(item.entity, &item.change, false);
        }
        pending.len()
    }
}
