use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a quota check. Denial is distinct from every validation error
/// so callers can surface a 429 rather than a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed { .. })
    }
}

/// One client's submission count for the current window.
#[derive(Debug, Clone, Copy)]
struct QuotaRecord {
    count: u32,
    reset_at: Instant,
}

/// Interface for quota enforcement. Single-instance deployments use the
/// in-memory table below; a multi-instance deployment would back the same
/// interface with a shared counter service.
pub trait QuotaStore: Send + Sync {
    fn check_and_consume(&self, key: &str) -> QuotaDecision;
}

/// Fixed-window counter keyed by client identifier. Each accepted check
/// consumes one unit; an expired record is replaced, not mutated. Keys are
/// never evicted, which is bounded by distinct-client cardinality and
/// acceptable for a low-traffic personal site.
pub struct InMemoryQuota {
    records: DashMap<String, QuotaRecord>,
    window: Duration,
    limit: u32,
}

impl InMemoryQuota {
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            records: DashMap::new(),
            window,
            limit,
        }
    }

    /// Same as [`QuotaStore::check_and_consume`] but with an explicit `now`,
    /// so window expiry is testable without sleeping.
    pub fn check_and_consume_at(&self, key: &str, now: Instant) -> QuotaDecision {
        let mut entry = self
            .records
            .entry(key.to_string())
            .or_insert(QuotaRecord {
                count: 0,
                reset_at: now + self.window,
            });

        if now > entry.reset_at {
            *entry = QuotaRecord {
                count: 1,
                reset_at: now + self.window,
            };
            return QuotaDecision::Allowed {
                remaining: self.limit - 1,
            };
        }

        if entry.count >= self.limit {
            return QuotaDecision::Denied {
                retry_after: entry.reset_at.saturating_duration_since(now),
            };
        }

        entry.count += 1;
        QuotaDecision::Allowed {
            remaining: self.limit - entry.count,
        }
    }
}

impl QuotaStore for InMemoryQuota {
    fn check_and_consume(&self, key: &str) -> QuotaDecision {
        self.check_and_consume_at(key, Instant::now())
    }
}
