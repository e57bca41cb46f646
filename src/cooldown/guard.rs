//! Device-local submission cooldown.
//!
//! Anti-spam only: at most 3 submissions per trailing 30 minutes per
//! device. History lives in secure storage as a JSON array of epoch
//! milliseconds. Unreadable or corrupt history counts as empty, so the
//! guard fails open and never blocks a submitter because of storage.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::store::SecureStore;

/// Secure storage key for the timestamp history.
pub const COOLDOWN_STORAGE_KEY: &str = "reportguard_submit_timestamps";

/// Trailing window length in seconds.
pub const COOLDOWN_WINDOW_SECS: i64 = 30 * 60;

/// Submissions allowed inside one window.
pub const MAX_SUBMISSIONS_PER_WINDOW: usize = 3;

const WINDOW_MS: i64 = COOLDOWN_WINDOW_SECS * 1000;

/// Answer to "may this device submit now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownDecision {
    pub allowed: bool,
    pub retry_after_secs: Option<u64>,
}

impl CooldownDecision {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_secs: None,
        }
    }

    pub fn blocked(retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Whole minutes to wait, rounded up, for user messaging.
    pub fn retry_after_minutes(&self) -> Option<u64> {
        self.retry_after_secs.map(|secs| (secs + 59) / 60)
    }
}

/// Rate limiter over a [`SecureStore`].
///
/// Each call performs its read-modify-write under one lock, so concurrent
/// submissions through the same guard cannot lose an update.
#[derive(Debug)]
pub struct SubmissionCooldownGuard<S> {
    store: S,
    lock: Mutex<()>,
}

impl<S: SecureStore> SubmissionCooldownGuard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn can_submit(&self) -> CooldownDecision {
        self.can_submit_at(Utc::now())
    }

    pub fn can_submit_at(&self, now: DateTime<Utc>) -> CooldownDecision {
        let _guard = self.lock.lock();
        let now_ms = now.timestamp_millis();
        let in_window = in_window(self.load_history(), now_ms);

        if in_window.len() < MAX_SUBMISSIONS_PER_WINDOW {
            return CooldownDecision::allowed();
        }

        // Non-empty: len >= MAX_SUBMISSIONS_PER_WINDOW > 0
        let oldest = in_window.iter().copied().min().unwrap_or(now_ms);
        let remaining_ms = oldest
            .saturating_add(WINDOW_MS)
            .saturating_sub(now_ms)
            .clamp(0, WINDOW_MS);
        let retry_after_secs = (remaining_ms as u64 + 999) / 1000;

        log::info!(
            "COOLDOWN_BLOCKED in_window={} retry_after_secs={}",
            in_window.len(),
            retry_after_secs
        );
        CooldownDecision::blocked(retry_after_secs)
    }

    pub fn record_submission(&self) {
        self.record_submission_at(Utc::now())
    }

    /// Drop expired entries, append `now`, persist. Write failures are
    /// logged and ignored.
    pub fn record_submission_at(&self, now: DateTime<Utc>) {
        let _guard = self.lock.lock();
        let now_ms = now.timestamp_millis();
        let mut history = in_window(self.load_history(), now_ms);
        history.push(now_ms);

        let encoded = match serde_json::to_string(&history) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("COOLDOWN_ENCODE_FAILED error={}", e);
                return;
            }
        };
        match self.store.set(COOLDOWN_STORAGE_KEY, &encoded) {
            Ok(()) => log::debug!("COOLDOWN_RECORDED in_window={}", history.len()),
            Err(e) => log::warn!("COOLDOWN_WRITE_FAILED error={}", e),
        }
    }

    fn load_history(&self) -> Vec<i64> {
        let raw = match self.store.get(COOLDOWN_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("COOLDOWN_READ_FAILED error={} fallback=empty", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(history) => history,
            Err(e) => {
                log::warn!("COOLDOWN_HISTORY_CORRUPT error={} fallback=empty", e);
                Vec::new()
            }
        }
    }
}

/// Entries inside the trailing window ending at `now_ms`. Entries dated
/// after `now_ms` (clock moved back, tampered record) are dropped.
fn in_window(history: Vec<i64>, now_ms: i64) -> Vec<i64> {
    history
        .into_iter()
        .filter(|t| {
            now_ms
                .checked_sub(*t)
                .map_or(false, |age| (0..WINDOW_MS).contains(&age))
        })
        .collect()
}
