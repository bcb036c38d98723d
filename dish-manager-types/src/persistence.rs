//! Persistence seam for the three `ignore*` flags (spec §6: `ignoreSpf`,
//! `ignoreSpfrx`, `ignoreB5dc` "persisted across restarts").
//!
//! The core never touches a filesystem or database directly; it calls
//! through this trait, leaving the concrete store (a config file, a TANGO
//! memorized attribute, whatever the deployment uses) to the front-end that
//! wires a `PersistedFlags` implementation in. This mirrors the way the
//! teacher's external collaborators (queues, schedulers) are always reached
//! through a trait object rather than a concrete type.

use std::sync::Mutex;

/// The three device-ignore flags, persisted across process restarts.
pub trait PersistedFlags: Send + Sync {
    fn ignore_spf(&self) -> bool;
    fn set_ignore_spf(&self, value: bool);

    fn ignore_spfrx(&self) -> bool;
    fn set_ignore_spfrx(&self, value: bool);

    fn ignore_b5dc(&self) -> bool;
    fn set_ignore_b5dc(&self, value: bool);
}

/// An in-memory `PersistedFlags` for tests and for deployments that accept
/// flags resetting to their defaults across a restart.
#[derive(Debug, Default)]
pub struct InMemoryFlags {
    ignore_spf: Mutex<bool>,
    ignore_spfrx: Mutex<bool>,
    ignore_b5dc: Mutex<bool>,
}

impl PersistedFlags for InMemoryFlags {
    fn ignore_spf(&self) -> bool {
        *self.ignore_spf.lock().expect("ignore_spf lock poisoned")
    }

    fn set_ignore_spf(&self, value: bool) {
        *self.ignore_spf.lock().expect("ignore_spf lock poisoned") = value;
    }

    fn ignore_spfrx(&self) -> bool {
        *self.ignore_spfrx.lock().expect("ignore_spfrx lock poisoned")
    }

    fn set_ignore_spfrx(&self, value: bool) {
        *self.ignore_spfrx.lock().expect("ignore_spfrx lock poisoned") = value;
    }

    fn ignore_b5dc(&self) -> bool {
        *self.ignore_b5dc.lock().expect("ignore_b5dc lock poisoned")
    }

    fn set_ignore_b5dc(&self, value: bool) {
        *self.ignore_b5dc.lock().expect("ignore_b5dc lock poisoned") = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_false() {
        let flags = InMemoryFlags::default();
        assert!(!flags.ignore_spf());
        assert!(!flags.ignore_spfrx());
        assert!(!flags.ignore_b5dc());
    }

    #[test]
    fn each_flag_is_set_independently() {
        let flags = InMemoryFlags::default();
        flags.set_ignore_spf(true);
        assert!(flags.ignore_spf());
        assert!(!flags.ignore_spfrx());
        assert!(!flags.ignore_b5dc());
    }
}
