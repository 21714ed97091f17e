//! Observer registries.
//!
//! [`ObserverRegistry`] holds one [`Observation`] per distinct
//! [`ComponentFilter`]: the filter, the entities matched since the last
//! notify phase, and the subscribers to hand them to.
//!
//! [`HierarchySubscribers`] keeps the subscribers of each relation.
//!
//! Both registries are generic over the callback type so they can be driven
//! without a running [`Ecs`](crate::Ecs).

use std::collections::HashMap;

use reflex_foundation::{ComponentKind, EntityId, RelationId};
use reflex_storage::ChangeSet;

use crate::filter::ComponentFilter;

// =============================================================================
// Subscriber
// =============================================================================

/// A registered callback and the label it is reported under.
#[derive(Debug)]
pub struct Subscriber<F> {
    /// Name used in logs and error frames.
    pub label: String,
    /// The callback.
    pub callback: F,
}

impl<F> Subscriber<F> {
    /// Creates a subscriber.
    pub fn new(label: impl Into<String>, callback: F) -> Self {
        Self {
            label: label.into(),
            callback,
        }
    }
}

/// Puts `taken` back in `slot`, keeping anything registered meanwhile after it.
fn restore<F>(slot: &mut Vec<Subscriber<F>>, taken: Vec<Subscriber<F>>) {
    let added = std::mem::replace(slot, taken);
    slot.extend(added);
}

// =============================================================================
// Observation
// =============================================================================

/// One observer entry: a filter, its matches, and its subscribers.
#[derive(Debug)]
pub struct Observation<F> {
    filter: ComponentFilter,
    matches: Vec<EntityId>,
    subscribers: Vec<Subscriber<F>>,
}

impl<F> Observation<F> {
    /// The entry's filter.
    #[must_use]
    pub fn filter(&self) -> &ComponentFilter {
        &self.filter
    }

    /// Entities matched since the last notify phase, in match order.
    ///
    /// The same entity appears once per matching mutation.
    #[must_use]
    pub fn matches(&self) -> &[EntityId] {
        &self.matches
    }

    /// Number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// =============================================================================
// Observer Registry
// =============================================================================

/// Observer entries, in filter registration order.
#[derive(Debug)]
pub struct ObserverRegistry<F> {
    entries: Vec<Observation<F>>,
    index: HashMap<ComponentFilter, usize>,
}

impl<F> Default for ObserverRegistry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<F> ObserverRegistry<F> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber for `filter`, creating the entry if needed.
    ///
    /// Returns the entry's position.
    pub fn subscribe(&mut self, filter: ComponentFilter, subscriber: Subscriber<F>) -> usize {
        let slot = self.entry(filter);
        self.entries[slot].subscribers.push(subscriber);
        slot
    }

    fn entry(&mut self, filter: ComponentFilter) -> usize {
        if let Some(&slot) = self.index.get(&filter) {
            return slot;
        }
        let slot = self.entries.len();
        self.index.insert(filter.clone(), slot);
        self.entries.push(Observation {
            filter,
            matches: Vec::new(),
            subscribers: Vec::new(),
        });
        slot
    }

    /// Runs every entry's filter and appends `entity` to each that passes.
    ///
    /// No deduplication: an entity matched twice in a tick is delivered twice.
    /// Returns the number of entries the entity was appended to.
    pub fn classify(
        &mut self,
        entity: EntityId,
        kinds: &[ComponentKind],
        change: &ChangeSet,
    ) -> usize {
        let mut matched = 0;
        for entry in &mut self.entries {
            if entry.filter.test(kinds, change) {
                entry.matches.push(entity);
                matched += 1;
            }
        }
        matched
    }

    /// Takes every entry's match list, leaving fresh empty lists behind.
    ///
    /// The result is indexed by entry position.
    pub fn take_matches(&mut self) -> Vec<Vec<EntityId>> {
        self.entries
            .iter_mut()
            .map(|entry| std::mem::take(&mut entry.matches))
            .collect()
    }

    /// Detaches the subscribers of entry `slot` so they can be invoked.
    pub fn take_subscribers(&mut self, slot: usize) -> Vec<Subscriber<F>> {
        self.entries
            .get_mut(slot)
            .map(|entry| std::mem::take(&mut entry.subscribers))
            .unwrap_or_default()
    }

    /// Reattaches subscribers taken with [`take_subscribers`](Self::take_subscribers).
    pub fn restore_subscribers(&mut self, slot: usize, taken: Vec<Subscriber<F>>) {
        if let Some(entry) = self.entries.get_mut(slot) {
            restore(&mut entry.subscribers, taken);
        }
    }

    /// Looks up the entry for `filter`.
    #[must_use]
    pub fn get(&self, filter: &ComponentFilter) -> Option<&Observation<F>> {
        self.index.get(filter).map(|&slot| &self.entries[slot])
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Observation<F>> {
        self.entries.iter()
    }

    /// Number of distinct filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no filter is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Hierarchy Subscribers
// =============================================================================

/// Hierarchy subscribers, per relation.
#[derive(Debug)]
pub struct HierarchySubscribers<F> {
    relations: Vec<Vec<Subscriber<F>>>,
}

impl<F> Default for HierarchySubscribers<F> {
    fn default() -> Self {
        Self {
            relations: Vec::new(),
        }
    }
}

impl<F> HierarchySubscribers<F> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber to `relation`.
    pub fn subscribe(&mut self, relation: RelationId, subscriber: Subscriber<F>) {
        let idx = relation.index() as usize;
        if idx >= self.relations.len() {
            self.relations.resize_with(idx + 1, Vec::new);
        }
        self.relations[idx].push(subscriber);
    }

    /// Number of subscribers on `relation`.
    #[must_use]
    pub fn count(&self, relation: RelationId) -> usize {
        self.relations
            .get(relation.index() as usize)
            .map_or(0, Vec::len)
    }

    /// Detaches the subscribers of `relation` so they can be invoked.
    pub fn take(&mut self, relation: RelationId) -> Vec<Subscriber<F>> {
        self.relations
            .get_mut(relation.index() as usize)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Reattaches subscribers taken with [`take`](Self::take).
    pub fn restore(&mut self, relation: RelationId, taken: Vec<Subscriber<F>>) {
        if taken.is_empty() {
            return;
        }
        let idx = relation.index() as usize;
        if idx >= self.relations.len() {
            self.relations.resize_with(idx + 1, Vec::new);
        }
        restore(&mut self.relations[idx], taken);
    }
}
