//! Capacity-bounded, most-recent-first store of live opportunities.
//!
//! Entries leave the store only by falling off the tail when capacity is
//! exceeded. Expiry is a display concern (see [`crate::expiry`]); an expired
//! entry stays until evicted because the server may still mark it executed.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use arbwatch_core::ArbitrageOpportunity;
use tracing::debug;

/// Default number of opportunities kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Ordered, id-deduplicated set of opportunities, most recently updated first.
#[derive(Debug, Clone)]
pub struct OpportunitySet {
    entries: VecDeque<ArbitrageOpportunity>,
    capacity: usize,
}

impl Default for OpportunitySet {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl OpportunitySet {
    /// Creates an empty set. A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ArbitrageOpportunity> {
        self.entries.iter().find(|o| o.id == id)
    }

    /// Inserts `opportunity` at the front, replacing any entry with the same
    /// id. Evicts from the tail when over capacity.
    pub fn upsert(&mut self, opportunity: ArbitrageOpportunity) {
        if let Some(pos) = self.entries.iter().position(|o| o.id == opportunity.id) {
            self.entries.remove(pos);
        }
        self.entries.push_front(opportunity);
        self.evict();
    }

    /// Replaces the whole store with `opportunities`, keeping their order.
    /// Later duplicates of an id are ignored; the capacity cap applies.
    pub fn initialize_from(
        &mut self,
        opportunities: impl IntoIterator<Item = ArbitrageOpportunity>,
    ) {
        self.entries.clear();
        let mut seen = HashSet::new();
        for opportunity in opportunities {
            if self.entries.len() == self.capacity {
                break;
            }
            if seen.insert(opportunity.id.clone()) {
                self.entries.push_back(opportunity);
            }
        }
    }

    /// Immutable copy of the current contents, front first.
    #[must_use]
    pub fn snapshot(&self) -> Arc<[ArbitrageOpportunity]> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArbitrageOpportunity> {
        self.entries.iter()
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(id = %evicted.id, "Evicted opportunity at capacity");
            }
        }
    }
}

/// Entries of `current` whose id is absent from `previous`, in `current`'s
/// order.
#[must_use]
pub fn snapshot_diff<'a>(
    previous: &[ArbitrageOpportunity],
    current: &'a [ArbitrageOpportunity],
) -> Vec<&'a ArbitrageOpportunity> {
    let known: HashSet<&str> = previous.iter().map(|o| o.id.as_str()).collect();
    current
        .iter()
        .filter(|o| !known.contains(o.id.as_str()))
        .collect()
}
