use super::compress::StateKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// One TD(λ) bootstrap step: `u + alpha * (reward + lambda * next - u)`.
pub fn td_update(utility: f64, reward: f64, next: f64, alpha: f64, lambda: f64) -> f64 {
    utility + alpha * (reward + lambda * next - utility)
}

/// Learned utilities of compressed states. Unseen states are worth 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilityTable {
    values: HashMap<StateKey, f64>,
}

/// Summary of a table's contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub len: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl UtilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &StateKey) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.values.contains_key(key)
    }

    /// Records `key` at utility 0 if unseen. Returns true if it was new.
    pub fn touch(&mut self, key: &StateKey) -> bool {
        if self.values.contains_key(key) {
            return false;
        }
        self.values.insert(key.clone(), 0.0);
        true
    }

    pub fn set(&mut self, key: StateKey, utility: f64) {
        self.values.insert(key, utility);
    }

    /// Moves U(s) toward `reward + lambda * U(s')` and returns the new U(s).
    pub fn update(
        &mut self,
        state: &StateKey,
        next: &StateKey,
        reward: f64,
        alpha: f64,
        lambda: f64,
    ) -> f64 {
        let utility = td_update(self.get(state), reward, self.get(next), alpha, lambda);
        self.values.insert(state.clone(), utility);
        utility
    }

    /// Moves U(s) toward `reward` with no successor.
    pub fn update_terminal(&mut self, state: &StateKey, reward: f64, alpha: f64) -> f64 {
        let utility = td_update(self.get(state), reward, 0.0, alpha, 0.0);
        self.values.insert(state.clone(), utility);
        utility
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, f64)> {
        self.values.iter().map(|(key, value)| (key, *value))
    }

    /// Entries sorted by key, for stable output.
    pub fn sorted_entries(&self) -> Vec<(StateKey, f64)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Adds every entry of `other`, overwriting shared keys.
    pub fn merge(&mut self, other: UtilityTable) {
        self.values.extend(other.values);
    }

    pub fn stats(&self) -> Option<TableStats> {
        if self.values.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for value in self.values.values() {
            min = min.min(*value);
            max = max.max(*value);
            sum += value;
        }
        Some(TableStats {
            len: self.values.len(),
            min,
            mean: sum / self.values.len() as f64,
            max,
        })
    }
}

impl FromIterator<(StateKey, f64)> for UtilityTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, f64)>>(iter: I) -> Self {
        UtilityTable {
            values: iter.into_iter().collect(),
        }
    }
}

/// A utility table several agents can learn into.
///
/// Each access holds the lock for the whole closure, so a read-modify-write
/// of an entry is never interleaved with another agent's.
#[derive(Debug, Clone, Default)]
pub struct SharedUtilities(Arc<Mutex<UtilityTable>>);

impl SharedUtilities {
    pub fn new(table: UtilityTable) -> Self {
        SharedUtilities(Arc::new(Mutex::new(table)))
    }

    fn lock(&self) -> MutexGuard<'_, UtilityTable> {
        // Entries stay whole even if a holder panicked.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut UtilityTable) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> UtilityTable {
        self.lock().clone()
    }
}
