//! LRC Tracker (C4, spec §4.4): allocates command ids, records per-command
//! lifecycle and progress, and bounds the retained history with FIFO
//! eviction.

use dish_manager_types::{new_command_id, LrcRecord, LrcResult, LrcTrackerConfig, TaskStatus};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Invoked on every tracked record update; C10 uses this to push change
/// events to the service front-end.
pub type LrcObserver = Arc<dyn Fn(&LrcRecord) + Send + Sync>;

/// Bounded, FIFO-evicting history of long-running-command records.
pub struct LrcTracker {
    records: Mutex<VecDeque<LrcRecord>>,
    config: LrcTrackerConfig,
    nonce: AtomicU32,
    observer: Mutex<Option<LrcObserver>>,
}

impl LrcTracker {
    pub fn new(config: LrcTrackerConfig) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(config.history_bound)),
            config,
            nonce: AtomicU32::new(0),
            observer: Mutex::new(None),
        }
    }

    pub fn set_observer(&self, observer: LrcObserver) {
        *self.observer.lock().expect("observer lock poisoned") = Some(observer);
    }

    /// Allocate a fresh id and append a `QUEUED` record, evicting the
    /// oldest record if the history bound is exceeded.
    pub fn new_command(&self, command_name: &str) -> String {
        let tai_timestamp = crate::tai::current_tai_timestamp();
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let id = new_command_id(tai_timestamp, nonce, command_name);
        let record = LrcRecord::new(id.clone(), command_name);

        let mut records = self.records.lock().expect("lrc lock poisoned");
        if records.len() >= self.config.history_bound {
            records.pop_front();
        }
        records.push_back(record.clone());
        drop(records);
        self.notify(&record);
        id
    }

    /// Append a progress message.
    pub fn push_progress(&self, id: &str, message: impl Into<String>) {
        self.mutate(id, |record| record.push_progress(message));
    }

    /// Move a record to a new (possibly non-terminal) status.
    pub fn set_status(&self, id: &str, status: TaskStatus) {
        self.mutate(id, |record| record.set_status(status));
    }

    /// Move a record to a terminal status with its final result.
    pub fn complete(&self, id: &str, status: TaskStatus, result: LrcResult) {
        self.mutate(id, |record| record.complete(status, result.clone()));
    }

    fn mutate(&self, id: &str, f: impl FnOnce(&mut LrcRecord)) {
        let mut records = self.records.lock().expect("lrc lock poisoned");
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return;
        };
        f(record);
        let snapshot = record.clone();
        drop(records);
        self.notify(&snapshot);
    }

    fn notify(&self, record: &LrcRecord) {
        if let Some(observer) = self.observer.lock().expect("observer lock poisoned").as_ref() {
            observer(record);
        }
    }

    pub fn get(&self, id: &str) -> Option<LrcRecord> {
        self.records
            .lock()
            .expect("lrc lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn list_with_status(&self, predicate: impl Fn(TaskStatus) -> bool) -> Vec<String> {
        self.records
            .lock()
            .expect("lrc lock poisoned")
            .iter()
            .filter(|r| predicate(r.status))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn list_in_queue(&self) -> Vec<String> {
        self.list_with_status(|s| !s.is_terminal())
    }

    pub fn list_in_progress(&self) -> Vec<String> {
        self.list_with_status(|s| s == TaskStatus::InProgress)
    }

    pub fn list_terminal(&self) -> Vec<String> {
        self.list_with_status(TaskStatus::is_terminal)
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("lrc lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LrcTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LrcTracker")
            .field("len", &self.len())
            .field("history_bound", &self.config.history_bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_command_is_queued_and_in_the_queue_list() {
        let tracker = LrcTracker::new(LrcTrackerConfig { history_bound: 8 });
        let id = tracker.new_command("SetStandbyFPMode");
        assert!(tracker.list_in_queue().contains(&id));
        assert_eq!(tracker.get(&id).unwrap().status, TaskStatus::Queued);
    }

    #[test]
    fn completed_command_leaves_the_queue_but_stays_in_history() {
        let tracker = LrcTracker::new(LrcTrackerConfig { history_bound: 8 });
        let id = tracker.new_command("SetStandbyFPMode");
        tracker.complete(&id, TaskStatus::Completed, LrcResult::ok("done"));
        assert!(!tracker.list_in_queue().contains(&id));
        assert!(tracker.list_terminal().contains(&id));
    }

    #[test]
    fn history_evicts_oldest_beyond_bound() {
        let tracker = LrcTracker::new(LrcTrackerConfig { history_bound: 2 });
        let first = tracker.new_command("SetStowMode");
        tracker.new_command("SetStandbyLPMode");
        tracker.new_command("SetStandbyFPMode");
        assert_eq!(tracker.len(), 2);
        assert!(tracker.get(&first).is_none());
    }

    #[test]
    fn observer_is_notified_on_every_mutation() {
        let tracker = LrcTracker::new(LrcTrackerConfig { history_bound: 8 });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        tracker.set_observer(Arc::new(move |record| {
            seen_clone.lock().unwrap().push(record.status);
        }));
        let id = tracker.new_command("SetStowMode");
        tracker.set_status(&id, TaskStatus::InProgress);
        tracker.complete(&id, TaskStatus::Completed, LrcResult::ok("ok"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![TaskStatus::Queued, TaskStatus::InProgress, TaskStatus::Completed]
        );
    }
}
