//! Scheduler Context
//!
//! Everything task managers share: the policy registry, the fallback caches,
//! the configuration and the optional diagnostics sink. Built once and handed
//! to every manager through an `Arc`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::components::{LocationState, WorkerKind};
use crate::config::SchedulerConfig;
use crate::error::ContextError;
use crate::events::JsonlLogger;
use crate::tasks;

use super::cache::{CacheStamp, TaskCache};
use super::env::WorkerEnv;
use super::job::TaskJob;
use super::meta::MetaTask;
use super::registry::MetaTaskRegistry;

/// Score given to every fallback job
pub const FALLBACK_SCORE: f64 = 1.0;

/// Non-expiring caches used when no registered policy offers anything.
#[derive(Debug, Clone)]
pub struct FallbackCaches {
    person_inside: Arc<TaskCache>,
    robot_inside: Arc<TaskCache>,
    outside: Arc<TaskCache>,
}

impl FallbackCaches {
    /// Inside, people may sleep or eat and robots may only power down.
    /// Outside, the only option is to go back in.
    pub fn new(sleep: MetaTask, eat: MetaTask, return_inside: MetaTask) -> Self {
        let mut person_inside = TaskCache::new("fallback.inside", CacheStamp::Static);
        person_inside.add(TaskJob::fixed(sleep.clone(), FALLBACK_SCORE));
        person_inside.add(TaskJob::fixed(eat, FALLBACK_SCORE));

        let mut robot_inside = TaskCache::new("fallback.inside", CacheStamp::Static);
        robot_inside.add(TaskJob::fixed(sleep, FALLBACK_SCORE));

        let mut outside = TaskCache::new("fallback.outside", CacheStamp::Static);
        outside.add(TaskJob::fixed(return_inside, FALLBACK_SCORE));

        Self {
            person_inside: Arc::new(person_inside),
            robot_inside: Arc::new(robot_inside),
            outside: Arc::new(outside),
        }
    }

    /// Fallbacks built from the standard sleep, eat and return-inside policies
    pub fn standard() -> Self {
        Self::new(
            MetaTask::factory(tasks::SleepMeta::new()),
            MetaTask::factory(tasks::EatMeta::new()),
            MetaTask::factory(tasks::ReturnInsideMeta::new()),
        )
    }

    pub fn for_worker(&self, kind: WorkerKind, location: LocationState) -> &Arc<TaskCache> {
        match (location.is_unsheltered(), kind) {
            (true, _) => &self.outside,
            (false, WorkerKind::Person) => &self.person_inside,
            (false, WorkerKind::Robot) => &self.robot_inside,
        }
    }
}

#[derive(Debug)]
pub struct SchedulerContext {
    registry: MetaTaskRegistry,
    fallbacks: FallbackCaches,
    config: SchedulerConfig,
    diagnostics: Option<Mutex<JsonlLogger>>,
}

impl SchedulerContext {
    /// Creates a context with the standard fallback caches. Opens the
    /// diagnostics file when diagnostics are enabled.
    pub fn new(
        config: SchedulerConfig,
        registry: MetaTaskRegistry,
    ) -> Result<Arc<Self>, ContextError> {
        Self::with_fallbacks(config, registry, FallbackCaches::standard())
    }

    pub fn with_fallbacks(
        config: SchedulerConfig,
        registry: MetaTaskRegistry,
        fallbacks: FallbackCaches,
    ) -> Result<Arc<Self>, ContextError> {
        let diagnostics = if config.diagnostics.enabled {
            Some(Mutex::new(JsonlLogger::new(&config.diagnostics.path)?))
        } else {
            None
        };
        tracing::debug!(
            policies = registry.len(),
            diagnostics = diagnostics.is_some(),
            "scheduler context ready"
        );
        Ok(Arc::new(Self {
            registry,
            fallbacks,
            config,
            diagnostics,
        }))
    }

    /// Context with the standard policy library
    pub fn standard(config: SchedulerConfig) -> Result<Arc<Self>, ContextError> {
        Self::new(config, tasks::standard_registry())
    }

    pub fn registry(&self) -> &MetaTaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn fallback(&self, kind: WorkerKind, location: LocationState) -> Arc<TaskCache> {
        Arc::clone(self.fallbacks.for_worker(kind, location))
    }

    /// Scores every applicable policy for the worker. Falls back to the
    /// location's fallback cache when nothing scores above zero.
    pub fn build_cache(&self, env: &WorkerEnv<'_>) -> Arc<TaskCache> {
        let worker = env.worker;
        let mut cache = TaskCache::new(env.context_label(), CacheStamp::At(env.time.minute_tick()));
        for policy in self.registry.for_worker(worker.kind, worker.duty) {
            cache.add_all(policy.candidates(env));
        }

        let cache = if cache.is_empty() {
            tracing::debug!(worker = %worker.id, context = cache.context(), "no candidates, using fallback");
            self.fallback(worker.kind, worker.location)
        } else {
            Arc::new(cache)
        };
        tracing::debug!(
            worker = %worker.id,
            jobs = cache.len(),
            total = cache.total(),
            "task cache rebuilt"
        );
        self.record(env, &cache);
        cache
    }

    /// Number of cache records written to the diagnostics sink
    pub fn diagnostics_written(&self) -> u64 {
        self.diagnostics.as_ref().map_or(0, |sink| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record_count()
        })
    }

    /// Flushes the diagnostics sink.
    pub fn shutdown(&self) {
        if let Some(sink) = &self.diagnostics {
            let mut logger = sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = logger.flush() {
                tracing::warn!("failed to flush cache diagnostics: {}", e);
            }
        }
    }

    fn record(&self, env: &WorkerEnv<'_>, cache: &TaskCache) {
        let Some(sink) = &self.diagnostics else {
            return;
        };
        let record = cache.to_record(&env.worker.id, env.time);
        let mut logger = sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = logger.log(&record) {
            tracing::warn!(worker = %env.worker.id, "failed to write cache diagnostics: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Worker;
    use crate::scheduling::testing::fixed_policy;
    use task_events::{CacheRecord, SimTime};

    #[test]
    fn test_fallback_selection_by_location() {
        let fallbacks = FallbackCaches::standard();
        let descriptions = |cache: &TaskCache| -> Vec<String> {
            cache.jobs().iter().map(|j| j.description().to_string()).collect()
        };

        let person = fallbacks.for_worker(WorkerKind::Person, LocationState::InsideSettlement);
        assert_eq!(descriptions(person), vec!["Sleeping", "Eating"]);
        assert!(person.is_static());

        let robot = fallbacks.for_worker(WorkerKind::Robot, LocationState::InsideVehicle);
        assert_eq!(descriptions(robot), vec!["Sleeping"]);

        let outside = fallbacks.for_worker(WorkerKind::Person, LocationState::Outside);
        assert_eq!(descriptions(outside), vec!["Return inside"]);
        assert_eq!(outside.total(), FALLBACK_SCORE);
    }

    #[test]
    fn test_empty_registry_uses_shared_fallback() {
        let context = SchedulerContext::new(SchedulerConfig::default(), MetaTaskRegistry::new()).unwrap();
        let worker = Worker::person("w1", "Ana");
        let env = WorkerEnv::new(&worker, None, SimTime::start(), context.config());

        let first = context.build_cache(&env);
        let second = context.build_cache(&env);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_static());
    }

    #[test]
    fn test_build_cache_collects_candidates() {
        let registry = MetaTaskRegistry::new()
            .with(fixed_policy("a", "Alpha"))
            .unwrap();
        let context = SchedulerContext::new(SchedulerConfig::default(), registry).unwrap();
        let worker = Worker::person("w1", "Ana");
        let now = SimTime::new(3, 250.4);
        let env = WorkerEnv::new(&worker, None, now, context.config());

        let cache = context.build_cache(&env);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stamp(), CacheStamp::At(now.minute_tick()));
        assert_eq!(cache.context(), "off_duty.inside");
    }

    #[test]
    fn test_diagnostics_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.jsonl");
        let mut config = SchedulerConfig::default();
        config.diagnostics.enabled = true;
        config.diagnostics.path = path.to_string_lossy().into_owned();

        let context = SchedulerContext::new(config, MetaTaskRegistry::new()).unwrap();
        let worker = Worker::person("w1", "Ana");
        let env = WorkerEnv::new(&worker, None, SimTime::start(), context.config());
        context.build_cache(&env);
        context.shutdown();

        assert_eq!(context.diagnostics_written(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        let record: CacheRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert!(record.is_fallback());
        assert_eq!(record.jobs.len(), 2);
    }
}
