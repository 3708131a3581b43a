//! Cache diagnostics records.
//!
//! When diagnostics are enabled, each rebuild of a worker's task cache is
//! written as one [`CacheRecord`] for offline analysis of the scoring.

use serde::{Deserialize, Serialize};

use crate::event::WorkerId;
use crate::timestamp::SimTime;

/// One scored candidate inside a [`CacheRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub description: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,
    /// Human-readable breakdown of the base values and modifiers
    pub breakdown: String,
}

/// A snapshot of one cache rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub time: SimTime,
    pub worker_id: WorkerId,
    pub context: String,
    /// Minute tick the cache is valid for; `None` for a non-expiring cache
    pub stamp: Option<u64>,
    pub total: f64,
    pub jobs: Vec<JobRecord>,
}

impl CacheRecord {
    /// Returns true if this record describes a fallback (non-expiring) cache.
    pub fn is_fallback(&self) -> bool {
        self.stamp.is_none()
    }

    /// Returns the candidate with the highest score, if any.
    pub fn best_job(&self) -> Option<&JobRecord> {
        self.jobs.iter().max_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}
