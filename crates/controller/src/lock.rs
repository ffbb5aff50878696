//! Identification lock.
//!
//! Keeps the confirmed event of the current source so that re-analysing the
//! same clip with another persona stays on the same event.

use serde::Serialize;

/// Lock state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LockState {
    /// No confirmed identity.
    Unlocked,
    /// `confirmed_event` was confirmed for `source_key`.
    Locked {
        source_key: String,
        confirmed_event: String,
    },
}

/// Per-session identification state.
///
/// Only `confirm` mutates the lock; it is called after a successful
/// analysis, so failures leave it untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentificationLock {
    last_source_key: Option<String>,
    confirmed_event: Option<String>,
}

impl IdentificationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> LockState {
        match (&self.last_source_key, &self.confirmed_event) {
            (Some(key), Some(event)) => LockState::Locked {
                source_key: key.clone(),
                confirmed_event: event.clone(),
            },
            _ => LockState::Unlocked,
        }
    }

    /// Hint for a request on `source_key`.
    ///
    /// A different source behaves as unlocked and never inherits the event.
    pub fn hint_for(&self, source_key: &str) -> Option<String> {
        match (&self.last_source_key, &self.confirmed_event) {
            (Some(key), Some(event)) if key == source_key => Some(event.clone()),
            _ => None,
        }
    }

    /// Whether a confirmed result exists for `source_key`.
    pub fn is_locked_for(&self, source_key: &str) -> bool {
        self.hint_for(source_key).is_some()
    }

    /// Record a successful identification, replacing any previous one.
    pub fn confirm(&mut self, source_key: impl Into<String>, event: impl Into<String>) {
        self.last_source_key = Some(source_key.into());
        self.confirmed_event = Some(event.into());
    }

    /// Drop the confirmed identity.
    pub fn reset(&mut self) {
        self.last_source_key = None;
        self.confirmed_event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unlocked() {
        let lock = IdentificationLock::new();
        assert_eq!(lock.state(), LockState::Unlocked);
        assert!(lock.hint_for("u1").is_none());
    }

    #[test]
    fn test_confirm_then_same_source_yields_hint() {
        let mut lock = IdentificationLock::new();
        lock.confirm("u1", "2008 Final: A vs B");

        assert_eq!(lock.hint_for("u1").as_deref(), Some("2008 Final: A vs B"));
        assert!(lock.is_locked_for("u1"));
        assert_eq!(
            lock.state(),
            LockState::Locked {
                source_key: "u1".into(),
                confirmed_event: "2008 Final: A vs B".into()
            }
        );
    }

    #[test]
    fn test_other_source_never_gets_hint() {
        let mut lock = IdentificationLock::new();
        lock.confirm("u1", "E1");
        assert!(lock.hint_for("u2").is_none());

        lock.confirm("u2", "E2");
        assert!(lock.hint_for("u1").is_none());
        assert_eq!(lock.hint_for("u2").as_deref(), Some("E2"));
    }

    #[test]
    fn test_reset() {
        let mut lock = IdentificationLock::new();
        lock.confirm("u1", "E1");
        lock.reset();
        assert_eq!(lock.state(), LockState::Unlocked);
        assert!(!lock.is_locked_for("u1"));
    }
}
