//! Scan state: per-user records plus the set of already-evaluated
//! submissions.
//!
//! ### On-disk format
//!
//! ```json
//! { "users": { "<name>": { "checked_last": 1700000000, "reported": false } },
//!   "submissions": ["abc123", "def456"] }
//! ```
//!
//! The submission list is ordered oldest-first and bounded; ids past the
//! bound are evicted. The feed only serves recent items, so an id old
//! enough to be evicted can no longer show up in a listing.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{load_or_default, write_document};
use crate::Error;

/// Most recent submission ids retained in the evaluated set.
pub const MAX_TRACKED_SUBMISSIONS: usize = 10_000;

/// Durable record of one feed account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unix time of the most recent evaluation of this user.
    pub checked_last: i64,
    /// Set once a report has been filed. Never cleared by the program;
    /// an operator can reset it by editing the state file.
    pub reported: bool,
}

/// In-memory image of the state document.
///
/// `evaluated` is an index over `submissions`, rebuilt on load and kept in
/// step by [`ScanState::mark_evaluated`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScanState {
    users: HashMap<String, UserRecord>,
    submissions: Vec<String>,
    #[serde(skip)]
    evaluated: HashSet<String>,
}

impl ScanState {
    fn reindex(&mut self) {
        self.evaluated = self.submissions.iter().cloned().collect();
    }

    /// True when `id` has already been through an evaluation.
    pub fn has_evaluated(&self, id: &str) -> bool {
        self.evaluated.contains(id)
    }

    /// Record `id` as evaluated. Idempotent; evicts the oldest ids once
    /// the bound is exceeded.
    pub fn mark_evaluated(&mut self, id: &str) {
        if !self.evaluated.insert(id.to_string()) {
            return;
        }
        self.submissions.push(id.to_string());

        if self.submissions.len() > MAX_TRACKED_SUBMISSIONS {
            let overflow = self.submissions.len() - MAX_TRACKED_SUBMISSIONS;
            for old in self.submissions.drain(..overflow) {
                self.evaluated.remove(&old);
            }
        }
    }

    /// The stored record for `name`, or the default (never checked, not
    /// reported) for an unknown user.
    pub fn get_user(&self, name: &str) -> UserRecord {
        self.users.get(name).cloned().unwrap_or_default()
    }

    pub fn put_user(&mut self, name: &str, record: UserRecord) {
        self.users.insert(name.to_string(), record);
    }

    /// True when a report has already been filed for `name`.
    pub fn already_reported(&self, name: &str) -> bool {
        self.users.get(name).is_some_and(|u| u.reported)
    }
}

/// Handle on the scan state file.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current state. A missing or undecodable file yields a
    /// fresh empty state.
    pub fn load(&self) -> ScanState {
        let mut state: ScanState = load_or_default(&self.path);
        state.reindex();
        state
    }

    /// Persist `state`, replacing the file atomically.
    pub fn save(&self, state: &ScanState) -> Result<(), Error> {
        write_document(&self.path, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json.gz"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_yields_empty_state() {
        let (_dir, store) = temp_store();
        let state = store.load();

        assert!(!state.has_evaluated("abc"));
        assert!(!state.already_reported("someone"));
        assert_eq!(state.get_user("someone"), UserRecord::default());
        assert_eq!(state.get_user("someone").checked_last, 0);
        assert!(!state.get_user("someone").reported);
    }

    #[test]
    fn test_mark_evaluated_is_idempotent() {
        let (_dir, store) = temp_store();
        let mut state = store.load();

        state.mark_evaluated("abc");
        state.mark_evaluated("abc");
        state.mark_evaluated("abc");

        assert!(state.has_evaluated("abc"));
        assert_eq!(state.submissions.len(), 1);
    }

    #[test]
    fn test_state_roundtrip() {
        let (_dir, store) = temp_store();

        let mut state = store.load();
        state.mark_evaluated("abc");
        state.put_user("spammy", UserRecord { checked_last: 1_700_000_000, reported: true });
        state.put_user("benign", UserRecord { checked_last: 1_700_000_100, reported: false });
        store.save(&state).unwrap();

        let reloaded = store.load();
        assert!(reloaded.has_evaluated("abc"));
        assert!(!reloaded.has_evaluated("def"));
        assert!(reloaded.already_reported("spammy"));
        assert!(!reloaded.already_reported("benign"));
        assert_eq!(reloaded.get_user("spammy").checked_last, 1_700_000_000);
    }

    #[test]
    fn test_eviction_keeps_newest_ids() {
        let (_dir, store) = temp_store();
        let mut state = store.load();

        for i in 0..MAX_TRACKED_SUBMISSIONS + 5 {
            state.mark_evaluated(&format!("id-{i}"));
        }

        assert_eq!(state.submissions.len(), MAX_TRACKED_SUBMISSIONS);
        for i in 0..5 {
            assert!(!state.has_evaluated(&format!("id-{i}")));
        }
        assert!(state.has_evaluated("id-5"));
        assert!(state.has_evaluated(&format!("id-{}", MAX_TRACKED_SUBMISSIONS + 4)));
    }

    #[test]
    fn test_corrupt_file_yields_empty_state() {
        let (_dir, store) = temp_store();
        std::fs::write(&store.path, b"definitely not gzip").unwrap();

        let state = store.load();
        assert!(!state.has_evaluated("abc"));

        // A save afterwards replaces the corrupt file with a good one.
        let mut state = state;
        state.mark_evaluated("abc");
        store.save(&state).unwrap();
        assert!(store.load().has_evaluated("abc"));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let (_dir, store) = temp_store();
        let state = store.load();
        store.save(&state).unwrap();

        assert!(store.path.exists());
        assert!(!store.path.with_extension("tmp").exists());
    }
}
