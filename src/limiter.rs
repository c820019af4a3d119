//! Weekly export quota gated by a licence check.
//!
//! Every export or share passes through [`RateLimiter::check_export_limit`]
//! before any capture work starts. The limiter never fails outward: missing
//! keys, rejected licences and storage problems all resolve to "deny" and are
//! logged with a [`DenyReason`].
//!
//! The read/validate/write sequence spans the licence round trip and is not
//! serialized, so two overlapping checks can both read the same count.

use crate::clock::{Clock, WEEK_IN_MS};
use crate::license::{LicenseStatus, LicenseValidator};
use crate::store::{KeyValueStore, EXPORT_LOG_KEY, LICENSE_KEY};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Persisted quota bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLog {
    /// Milliseconds since the Unix epoch of the last approved export
    pub last_export: u64,
    /// Approved exports in the current window
    pub count: u32,
}

impl ExportLog {
    pub fn fresh(now_ms: u64) -> Self {
        Self {
            last_export: now_ms,
            count: 0,
        }
    }

    /// Reset the window when more than a week has passed since the last export.
    pub fn rolled_over(self, now_ms: u64) -> Self {
        if now_ms.saturating_sub(self.last_export) > WEEK_IN_MS {
            Self::fresh(now_ms)
        } else {
            self
        }
    }
}

/// Why an export was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MissingLicense,
    InvalidLicense(String),
    QuotaExhausted { quota: u32 },
    Storage(String),
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::MissingLicense => write!(f, "no license key found"),
            DenyReason::InvalidLicense(why) => write!(f, "invalid license: {}", why),
            DenyReason::QuotaExhausted { quota } => {
                write!(f, "weekly quota of {} exports used", quota)
            }
            DenyReason::Storage(why) => write!(f, "storage error: {}", why),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitDecision {
    Allowed { count: u32 },
    Denied(DenyReason),
}

impl LimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitDecision::Allowed { .. })
    }
}

/// Anything that can approve or refuse an export before capture starts.
pub trait ExportGate: Send + Sync {
    fn check_limit(&self) -> impl Future<Output = LimitDecision> + Send;
}

impl<T: ExportGate + ?Sized> ExportGate for std::sync::Arc<T> {
    fn check_limit(&self) -> impl Future<Output = LimitDecision> + Send {
        (**self).check_limit()
    }
}

pub struct RateLimiter<S, V, C> {
    store: S,
    validator: V,
    clock: C,
    weekly_quota: u32,
}

impl<S, V, C> RateLimiter<S, V, C>
where
    S: KeyValueStore,
    V: LicenseValidator,
    C: Clock,
{
    pub fn new(store: S, validator: V, clock: C, weekly_quota: u32) -> Self {
        Self {
            store,
            validator,
            clock,
            weekly_quota,
        }
    }

    pub fn weekly_quota(&self) -> u32 {
        self.weekly_quota
    }

    /// `true` when the export may proceed. The count has already been
    /// consumed when this returns `true`.
    pub async fn check_export_limit(&self) -> bool {
        self.check().await.is_allowed()
    }

    /// Same policy as [`check_export_limit`](Self::check_export_limit) but
    /// keeps the reason for a denial.
    pub async fn check(&self) -> LimitDecision {
        let decision = self.evaluate().await;
        match &decision {
            LimitDecision::Allowed { count } => {
                log::debug!("export allowed ({}/{} this week)", count, self.weekly_quota)
            }
            LimitDecision::Denied(reason) => log::warn!("export denied: {}", reason),
        }
        decision
    }

    async fn evaluate(&self) -> LimitDecision {
        let license_key = match self.store.get(LICENSE_KEY) {
            Ok(Some(k)) if !k.trim().is_empty() => k,
            Ok(_) => return LimitDecision::Denied(DenyReason::MissingLicense),
            Err(e) => return LimitDecision::Denied(DenyReason::Storage(e.to_string())),
        };

        match self.validator.validate(license_key.trim()).await {
            Ok(LicenseStatus::Valid) => {}
            Ok(LicenseStatus::Invalid(why)) => {
                return LimitDecision::Denied(DenyReason::InvalidLicense(why))
            }
            Err(e) => return LimitDecision::Denied(DenyReason::InvalidLicense(e.to_string())),
        }

        let now = self.clock.now_ms();
        let log = match self.read_log(now) {
            Ok(log) => log.rolled_over(now),
            Err(why) => return LimitDecision::Denied(DenyReason::Storage(why)),
        };

        if log.count >= self.weekly_quota {
            return LimitDecision::Denied(DenyReason::QuotaExhausted {
                quota: self.weekly_quota,
            });
        }

        let updated = ExportLog {
            last_export: now,
            count: log.count + 1,
        };
        if let Err(why) = self.write_log(&updated) {
            return LimitDecision::Denied(DenyReason::Storage(why));
        }
        LimitDecision::Allowed {
            count: updated.count,
        }
    }

    /// Current log as persisted, without rollover or mutation.
    pub fn export_log(&self) -> crate::Result<Option<ExportLog>> {
        match self.store.get(EXPORT_LOG_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Exports still available in the current window, without consuming one.
    pub fn remaining(&self) -> crate::Result<u32> {
        let now = self.clock.now_ms();
        let log = self
            .export_log()?
            .unwrap_or_else(|| ExportLog::fresh(now))
            .rolled_over(now);
        Ok(self.weekly_quota.saturating_sub(log.count))
    }

    fn read_log(&self, now: u64) -> std::result::Result<ExportLog, String> {
        self.export_log()
            .map(|log| log.unwrap_or_else(|| ExportLog::fresh(now)))
            .map_err(|e| e.to_string())
    }

    fn write_log(&self, log: &ExportLog) -> std::result::Result<(), String> {
        let raw = serde_json::to_string(log).map_err(|e| e.to_string())?;
        self.store
            .set(EXPORT_LOG_KEY, &raw)
            .map_err(|e| e.to_string())
    }
}

impl<S, V, C> ExportGate for RateLimiter<S, V, C>
where
    S: KeyValueStore,
    V: LicenseValidator,
    C: Clock,
{
    async fn check_limit(&self) -> LimitDecision {
        self.check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use crate::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedValidator {
        status: LicenseStatus,
        calls: AtomicUsize,
    }

    impl FixedValidator {
        fn valid() -> Self {
            Self {
                status: LicenseStatus::Valid,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LicenseValidator for FixedValidator {
        async fn validate(&self, _key: &str) -> Result<LicenseStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status.clone())
        }
    }

    fn licensed_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([(LICENSE_KEY, "KEY-123")]))
    }

    #[test]
    fn export_log_uses_camel_case_fields() {
        let log = ExportLog {
            last_export: 42,
            count: 2,
        };
        assert_eq!(
            serde_json::to_string(&log).unwrap(),
            r#"{"lastExport":42,"count":2}"#
        );
    }

    #[test]
    fn rollover_only_after_a_full_week() {
        let log = ExportLog {
            last_export: 0,
            count: 3,
        };
        assert_eq!(log.rolled_over(WEEK_IN_MS).count, 3);
        assert_eq!(log.rolled_over(WEEK_IN_MS + 1), ExportLog::fresh(WEEK_IN_MS + 1));
    }

    #[tokio::test]
    async fn quota_of_three_allows_three_then_denies() {
        let store = licensed_store();
        let clock = Arc::new(ManualClock::new(1_000));
        let limiter = RateLimiter::new(store.clone(), FixedValidator::valid(), clock.clone(), 3);

        for expected in 1..=3 {
            clock.advance(10);
            assert!(limiter.check_export_limit().await);
            assert_eq!(limiter.export_log().unwrap().unwrap().count, expected);
        }
        let before = limiter.export_log().unwrap().unwrap();
        clock.advance(10);
        assert_eq!(
            limiter.check().await,
            LimitDecision::Denied(DenyReason::QuotaExhausted { quota: 3 })
        );
        assert_eq!(limiter.export_log().unwrap().unwrap(), before);
        assert_eq!(limiter.remaining().unwrap(), 0);
    }

    #[tokio::test]
    async fn window_resets_after_a_week() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(licensed_store(), FixedValidator::valid(), clock.clone(), 1);
        assert!(limiter.check_export_limit().await);
        assert!(!limiter.check_export_limit().await);
        clock.advance(WEEK_IN_MS + 1);
        assert_eq!(limiter.remaining().unwrap(), 1);
        assert!(limiter.check_export_limit().await);
        let log = limiter.export_log().unwrap().unwrap();
        assert_eq!(log.count, 1);
        assert_eq!(log.last_export, WEEK_IN_MS + 1);
    }

    #[tokio::test]
    async fn missing_license_denies_without_touching_the_log() {
        let store = Arc::new(MemoryStore::new());
        let validator = Arc::new(FixedValidator::valid());
        let limiter = RateLimiter::new(store.clone(), validator.clone(), ManualClock::new(5), 3);
        assert_eq!(
            limiter.check().await,
            LimitDecision::Denied(DenyReason::MissingLicense)
        );
        assert_eq!(store.get(EXPORT_LOG_KEY).unwrap(), None);
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_license_denies() {
        let validator = FixedValidator {
            status: LicenseStatus::Invalid("expired".into()),
            calls: AtomicUsize::new(0),
        };
        let store = licensed_store();
        let limiter = RateLimiter::new(store.clone(), validator, ManualClock::new(5), 3);
        assert!(!limiter.check_export_limit().await);
        assert_eq!(store.get(EXPORT_LOG_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_log_denies_and_is_left_alone() {
        let store = licensed_store();
        store.set(EXPORT_LOG_KEY, "{broken").unwrap();
        let limiter = RateLimiter::new(store.clone(), FixedValidator::valid(), ManualClock::new(5), 3);
        assert!(matches!(
            limiter.check().await,
            LimitDecision::Denied(DenyReason::Storage(_))
        ));
        assert_eq!(store.get(EXPORT_LOG_KEY).unwrap().as_deref(), Some("{broken"));
    }

    #[tokio::test]
    async fn gate_checks_run_on_spawned_tasks() {
        let limiter = Arc::new(RateLimiter::new(
            licensed_store(),
            Arc::new(FixedValidator::valid()),
            ManualClock::new(1_000),
            3,
        ));
        let gate = limiter.clone();
        let decision = tokio::spawn(async move { gate.check_limit().await }).await.unwrap();
        assert_eq!(decision, LimitDecision::Allowed { count: 1 });
        assert_eq!(limiter.remaining().unwrap(), 2);
    }
}
