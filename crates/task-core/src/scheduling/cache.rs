//! Task Cache
//!
//! An immutable snapshot of every positive-scoring job for one worker at one
//! minute tick. A cumulative weight index makes each draw a binary search.

use rand::Rng;
use task_events::{CacheRecord, SimTime, WorkerId};

use super::job::TaskJob;

/// When a cache stops being valid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStamp {
    /// Never expires (fallback caches)
    Static,
    /// Valid during one minute tick
    At(u64),
}

/// Scored candidates for one worker.
#[derive(Debug, Clone)]
pub struct TaskCache {
    context: String,
    stamp: CacheStamp,
    jobs: Vec<TaskJob>,
    cumulative: Vec<f64>,
    total: f64,
}

impl TaskCache {
    pub fn new(context: impl Into<String>, stamp: CacheStamp) -> Self {
        Self {
            context: context.into(),
            stamp,
            jobs: Vec::new(),
            cumulative: Vec::new(),
            total: 0.0,
        }
    }

    /// Adds a job. Jobs that do not score above zero are ignored.
    pub fn add(&mut self, job: TaskJob) -> bool {
        let score = job.score();
        if !(score > 0.0 && score.is_finite()) {
            return false;
        }
        self.total += score;
        self.cumulative.push(self.total);
        self.jobs.push(job);
        true
    }

    pub fn add_all(&mut self, jobs: impl IntoIterator<Item = TaskJob>) {
        for job in jobs {
            self.add(job);
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn stamp(&self) -> CacheStamp {
        self.stamp
    }

    pub fn jobs(&self) -> &[TaskJob] {
        &self.jobs
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_static(&self) -> bool {
        self.stamp == CacheStamp::Static
    }

    /// True if the cache was computed for this minute tick and situation.
    pub fn is_current(&self, tick: u64, context: &str) -> bool {
        self.stamp == CacheStamp::At(tick) && self.context == context
    }

    /// Draws one job with probability proportional to its score.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TaskJob> {
        if self.jobs.is_empty() || self.total <= 0.0 {
            return None;
        }
        let r = rng.gen_range(0.0..self.total);
        let index = self.cumulative.partition_point(|&c| c <= r);
        self.jobs.get(index.min(self.jobs.len() - 1))
    }

    pub fn to_record(&self, worker_id: &WorkerId, time: SimTime) -> CacheRecord {
        CacheRecord {
            time,
            worker_id: worker_id.clone(),
            context: self.context.clone(),
            stamp: match self.stamp {
                CacheStamp::Static => None,
                CacheStamp::At(tick) => Some(tick),
            },
            total: self.total,
            jobs: self.jobs.iter().map(TaskJob::to_record).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::testing::fixed_policy;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cache_of(scores: &[(&'static str, f64)]) -> TaskCache {
        let mut cache = TaskCache::new("off_duty.inside", CacheStamp::At(1000));
        for (name, score) in scores {
            cache.add(TaskJob::fixed(fixed_policy(name, name), *score));
        }
        cache
    }

    #[test]
    fn test_total_is_sum_of_scores() {
        let cache = cache_of(&[("a", 10.0), ("b", 2.5), ("c", 7.5)]);
        assert_eq!(cache.total(), 20.0);
        assert_eq!(cache.len(), 3);
        let sum: f64 = cache.jobs().iter().map(|j| j.score()).sum();
        assert_eq!(sum, cache.total());
    }

    #[test]
    fn test_zero_scores_never_cached() {
        let mut cache = cache_of(&[("a", 5.0)]);
        assert!(!cache.add(TaskJob::fixed(fixed_policy("z", "Zero"), 0.0)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_cache_selects_nothing() {
        let cache = cache_of(&[]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(cache.select(&mut rng).is_none());
    }

    #[test]
    fn test_single_job_always_selected() {
        let cache = cache_of(&[("only", 0.5)]);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(cache.select(&mut rng).map(|j| j.description()), Some("only"));
        }
    }

    #[test]
    fn test_selection_distribution() {
        let cache = cache_of(&[("A", 30.0), ("B", 70.0)]);
        let mut rng = SmallRng::seed_from_u64(42);
        let draws = 100_000;
        let a = (0..draws)
            .filter(|_| cache.select(&mut rng).map(|j| j.description()) == Some("A"))
            .count();
        let share = a as f64 / draws as f64;
        assert!((share - 0.3).abs() < 0.01, "share of A was {}", share);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let cache = cache_of(&[("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)]);
        let mut first = SmallRng::seed_from_u64(99);
        let mut second = SmallRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                cache.select(&mut first).map(|j| j.description()),
                cache.select(&mut second).map(|j| j.description())
            );
        }
    }

    #[test]
    fn test_currency() {
        let cache = cache_of(&[("a", 1.0)]);
        assert!(cache.is_current(1000, "off_duty.inside"));
        assert!(!cache.is_current(1001, "off_duty.inside"));
        assert!(!cache.is_current(1000, "on_duty.inside"));

        let fallback = TaskCache::new("fallback.inside", CacheStamp::Static);
        assert!(fallback.is_static());
        assert!(!fallback.is_current(1000, "fallback.inside"));
    }

    #[test]
    fn test_record() {
        let cache = cache_of(&[("Reading", 12.0)]);
        let record = cache.to_record(&WorkerId::new("w1"), SimTime::new(1, 0.0));
        assert_eq!(record.stamp, Some(1000));
        assert_eq!(record.total, 12.0);
        assert_eq!(record.jobs[0].description, "Reading");
        assert!(record.jobs[0].breakdown.ends_with("= 12.00"));
    }
}
