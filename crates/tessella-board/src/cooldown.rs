//! Per-device cooldown ledger
//!
//! Tracks, per device token, the timestamp of the last accepted write and
//! enforces a minimum interval between writes. Entries are only ever dropped
//! in bulk, by the periodic sweep that runs while no viewer is connected;
//! an approximate cleanup, not a per-device TTL.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Tolerance at the cooldown boundary, absorbing clock and network jitter so
/// a request issued right on time is not spuriously rejected
const GRACE_MS: i64 = 30;

/// Mapping from device token to last-accepted-write time.
///
/// A value of `None` means the device is registered but has never written;
/// its first write is always accepted. Not internally synchronized: the
/// owning service guards check-and-consume plus the buffer write as one
/// critical section.
#[derive(Debug, Default)]
pub struct CooldownLedger {
    entries: HashMap<String, Option<DateTime<Utc>>>,
}

impl CooldownLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token with no write history. No-op if already present.
    pub fn register(&mut self, token: &str) {
        if !self.entries.contains_key(token) {
            self.entries.insert(token.to_string(), None);
        }
    }

    /// Whether the token has a ledger entry
    #[must_use]
    pub fn is_registered(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    /// Gate a write for the given token.
    ///
    /// On acceptance the entry is stamped with the current time in the same
    /// step, so no second write for the token can slip between check and
    /// update.
    pub fn check_and_consume(&mut self, token: &str, cooldown: Duration) -> Result<()> {
        self.check_and_consume_at(token, cooldown, Utc::now())
    }

    fn check_and_consume_at(
        &mut self,
        token: &str,
        cooldown: Duration,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = self.entries.get_mut(token).ok_or(Error::UnknownDevice)?;

        if let Some(last) = *entry {
            let required_ms = cooldown.num_milliseconds() - GRACE_MS;
            let elapsed_ms = (now - last).num_milliseconds();
            if elapsed_ms < required_ms {
                return Err(Error::TooSoon {
                    remaining_ms: required_ms - elapsed_ms,
                });
            }
        }

        *entry = Some(now);
        Ok(())
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Number of tracked tokens
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger tracks no tokens
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut ledger = CooldownLedger::new();
        ledger.register("tok");
        ledger.register("tok");
        assert_eq!(ledger.len(), 1);
        assert!(ledger.is_registered("tok"));
        assert!(!ledger.is_registered("other"));
    }

    #[test]
    fn test_first_write_always_accepted() {
        let mut ledger = CooldownLedger::new();
        ledger.register("tok");

        // No elapsed time since registration; a never-written device passes
        assert!(ledger
            .check_and_consume("tok", Duration::seconds(10))
            .is_ok());
    }

    #[test]
    fn test_unknown_token_rejected() {
        let mut ledger = CooldownLedger::new();
        let err = ledger
            .check_and_consume("forged", Duration::seconds(10))
            .unwrap_err();
        assert_eq!(err.code(), "unknown_device");
    }

    #[test]
    fn test_second_write_inside_window_rejected() {
        let mut ledger = CooldownLedger::new();
        ledger.register("tok");

        let t0 = Utc::now();
        let cooldown = Duration::seconds(10);
        ledger.check_and_consume_at("tok", cooldown, t0).unwrap();

        let err = ledger
            .check_and_consume_at("tok", cooldown, t0 + Duration::seconds(3))
            .unwrap_err();
        match err {
            Error::TooSoon { remaining_ms } => assert_eq!(remaining_ms, 7000 - GRACE_MS),
            other => panic!("expected TooSoon, got {other:?}"),
        }
    }

    #[test]
    fn test_boundary_write_accepted_within_grace() {
        let mut ledger = CooldownLedger::new();
        ledger.register("tok");

        let t0 = Utc::now();
        let cooldown = Duration::seconds(10);
        ledger.check_and_consume_at("tok", cooldown, t0).unwrap();

        // A hair before the nominal boundary, but inside the grace window
        let just_in_time = t0 + Duration::milliseconds(10_000 - GRACE_MS);
        assert!(ledger
            .check_and_consume_at("tok", cooldown, just_in_time)
            .is_ok());
    }

    #[test]
    fn test_accepted_write_restamps_the_entry() {
        let mut ledger = CooldownLedger::new();
        ledger.register("tok");

        let t0 = Utc::now();
        let cooldown = Duration::seconds(10);
        ledger.check_and_consume_at("tok", cooldown, t0).unwrap();
        ledger
            .check_and_consume_at("tok", cooldown, t0 + Duration::seconds(11))
            .unwrap();

        // Window restarts from the second write, not the first
        let err = ledger
            .check_and_consume_at("tok", cooldown, t0 + Duration::seconds(13))
            .unwrap_err();
        assert_eq!(err.code(), "too_soon");
    }

    #[test]
    fn test_clear_drops_all_entries() {
        let mut ledger = CooldownLedger::new();
        ledger.register("a");
        ledger.register("b");

        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());

        // A cleared token is unknown until re-registered
        let err = ledger
            .check_and_consume("a", Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err.code(), "unknown_device");
    }
}
