//! Persisted option defaults.
//!
//! The engine reads defaults once at session start and hands the seven
//! option values back after every changing edit. Persistence is
//! fire-and-forget: a store never blocks the edit on I/O and never reports
//! failure to its caller, it logs and carries on.

#![allow(missing_docs)]

pub mod preferences;
pub mod writer;

use crate::options::state::OptionState;

pub use preferences::{JsonFileStore, StoredOptions};

/// Key-value settings store holding the last-used generator options.
pub trait OptionStore {
    /// Read the persisted values, falling back per field when absent.
    fn load(&mut self) -> StoredOptions;

    /// Persist the seven option values of `state`. Never fails the caller.
    fn save(&mut self, state: &OptionState);

    /// Push out anything a debounced store is still holding.
    fn flush(&mut self) {}
}

/// Volatile store for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: StoredOptions,
    saves: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new(values: StoredOptions) -> Self {
        Self { values, saves: 0 }
    }

    /// Values as last saved (or as seeded).
    #[must_use]
    pub const fn values(&self) -> &StoredOptions {
        &self.values
    }

    /// Number of `save` calls observed.
    #[must_use]
    pub const fn save_count(&self) -> usize {
        self.saves
    }
}

impl OptionStore for MemoryStore {
    fn load(&mut self) -> StoredOptions {
        self.values.clone()
    }

    fn save(&mut self, state: &OptionState) {
        self.values = StoredOptions::from_state(state);
        self.saves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::default();
        let mut state = store.load().into_state();
        state.length = 24;
        state.use_special = false;
        store.save(&state);

        assert_eq!(store.save_count(), 1);
        let reloaded = store.load().into_state();
        assert_eq!(reloaded.length, 24);
        assert!(!reloaded.use_special);
    }
}
