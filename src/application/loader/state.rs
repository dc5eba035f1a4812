use std::{collections::HashSet, fmt};

use crate::domain::fragments::FragmentId;

use super::events::LoadEvent;

/// Fragments already rendered and bound. Grows monotonically for the life
/// of the loader and remembers load order.
#[derive(Debug, Clone, Default)]
pub struct LoadedSet {
    members: HashSet<FragmentId>,
    order: Vec<FragmentId>,
}

impl LoadedSet {
    /// Returns `false` when the fragment was already present.
    pub fn insert(&mut self, fragment: FragmentId) -> bool {
        if !self.members.insert(fragment.clone()) {
            return false;
        }
        self.order.push(fragment);
        true
    }

    pub fn contains(&self, fragment: &FragmentId) -> bool {
        self.members.contains(fragment)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Loaded fragments in the order they were loaded.
    pub fn iter(&self) -> impl Iterator<Item = &FragmentId> {
        self.order.iter()
    }
}

/// Counters carried between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    /// Completed passes.
    pub passes: u32,
    /// Consecutive completed passes that loaded nothing.
    pub attempts_since_last_gain: u32,
    pub is_initial_pass: bool,
    /// Fragments not yet loaded.
    pub remaining: usize,
}

impl PollState {
    pub fn new(total: usize) -> Self {
        Self {
            passes: 0,
            attempts_since_last_gain: 0,
            is_initial_pass: true,
            remaining: total,
        }
    }
}

/// Result of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub gained: usize,
    /// Polling has stopped for good; no further pass will fetch anything.
    pub finished: bool,
    /// Diagnostics emitted during the pass, in emission order.
    pub events: Vec<LoadEvent>,
}

impl PollOutcome {
    pub(crate) fn idle() -> Self {
        Self {
            gained: 0,
            finished: true,
            events: Vec::new(),
        }
    }
}

/// Snapshot reported by the status introspection command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderStatus {
    pub loaded: Vec<FragmentId>,
    pub total: usize,
    pub finished: bool,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fragments loaded: {}/{}", self.loaded.len(), self.total)?;
        write!(f, "Loaded fragments:")?;
        if self.loaded.is_empty() {
            write!(f, " (none)")?;
        }
        for fragment in &self.loaded {
            write!(f, "\n  - {fragment}")?;
        }
        Ok(())
    }
}
