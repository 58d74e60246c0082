//! Lot expiry classification and alerting.
//!
//! Everything here is a pure function of its inputs. "Today" is always a
//! parameter so handlers decide which calendar (local time) they mean and
//! tests can pin it.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Lot, LotView};

/// Days before expiration at which a lot starts counting as near expiry.
pub const DEFAULT_WARN_DAYS: i64 = 30;

/// Today's date on the server's local calendar.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

// ── Policy ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Inclusive upper bound of the near-expiry window.
    pub warn_days: i64,
}

impl ExpiryPolicy {
    pub fn new(warn_days: i64) -> Self {
        Self { warn_days }
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_DAYS)
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryStatus {
    /// No usable expiration date.
    Unknown,
    Expired,
    NearExpiry,
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Ok,
    Warning,
    Critical,
}

impl ExpiryStatus {
    pub fn label(self) -> &'static str {
        match self {
            ExpiryStatus::Unknown => "unknown",
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::NearExpiry => "near-expiry",
            ExpiryStatus::Ok => "ok",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ExpiryStatus::Unknown => Severity::None,
            ExpiryStatus::Expired => Severity::Critical,
            ExpiryStatus::NearExpiry => Severity::Warning,
            ExpiryStatus::Ok => Severity::Ok,
        }
    }

    /// Expired and near-expiry lots are the ones worth alerting on.
    pub fn is_alerting(self) -> bool {
        matches!(self, ExpiryStatus::Expired | ExpiryStatus::NearExpiry)
    }
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Parses an expiration date as sent by clients.
///
/// Accepts `YYYY-MM-DD` or any longer ISO timestamp, of which only the date
/// part (first 10 characters) is used. Empty or malformed input is `None`.
pub fn parse_expiration(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    if date_part.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Whole calendar days from `today` until `expiration`. Negative once the
/// date has passed, `None` when there is no date to compare.
pub fn days_until(expiration: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expiration.map(|date| (date - today).num_days())
}

pub fn status_from_days(days: Option<i64>, policy: ExpiryPolicy) -> ExpiryStatus {
    match days {
        None => ExpiryStatus::Unknown,
        Some(d) if d < 0 => ExpiryStatus::Expired,
        Some(d) if d <= policy.warn_days => ExpiryStatus::NearExpiry,
        Some(_) => ExpiryStatus::Ok,
    }
}

/// Convenience for the common `parse → days_until → status` chain.
pub fn classify(expiration: Option<NaiveDate>, today: NaiveDate, policy: ExpiryPolicy) -> ExpiryStatus {
    status_from_days(days_until(expiration, today), policy)
}

// ── Alert aggregation ────────────────────────────────────────────────────────

/// Anything with an expiration date and a per-record alert switch.
pub trait Expirable {
    fn expiration_date(&self) -> Option<NaiveDate>;

    /// Records without an explicit flag alert by default.
    fn notifications_enabled(&self) -> bool {
        true
    }

    fn is_discarded(&self) -> bool {
        false
    }
}

impl Expirable for Lot {
    fn expiration_date(&self) -> Option<NaiveDate> {
        Some(self.expiration_date)
    }

    fn notifications_enabled(&self) -> bool {
        self.notification_enabled
    }

    fn is_discarded(&self) -> bool {
        self.discarded
    }
}

impl<T: Expirable + ?Sized> Expirable for &T {
    fn expiration_date(&self) -> Option<NaiveDate> {
        (**self).expiration_date()
    }

    fn notifications_enabled(&self) -> bool {
        (**self).notifications_enabled()
    }

    fn is_discarded(&self) -> bool {
        (**self).is_discarded()
    }
}

/// Items that are expired or near expiry and have notifications enabled,
/// in input order.
pub fn compute_alerts<T: Expirable>(items: &[T], today: NaiveDate, policy: ExpiryPolicy) -> Vec<&T> {
    items
        .iter()
        .filter(|item| item.notifications_enabled())
        .filter(|item| classify(item.expiration_date(), today, policy).is_alerting())
        .collect()
}

/// Items whose expiration date is strictly before `today` and that have not
/// been discarded yet.
pub fn expired_lots<T: Expirable>(items: &[T], today: NaiveDate) -> Vec<&T> {
    items
        .iter()
        .filter(|item| !item.is_discarded())
        .filter(|item| item.expiration_date().is_some_and(|d| d < today))
        .collect()
}

pub fn annotate(lot: Lot, today: NaiveDate, policy: ExpiryPolicy) -> LotView {
    let days_remaining = days_until(Some(lot.expiration_date), today);
    let status = status_from_days(days_remaining, policy);
    LotView {
        lot,
        days_remaining,
        status,
        severity: status.severity(),
    }
}
