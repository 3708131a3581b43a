//! Policies and tasks shared by the scheduling unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::TaskError;

use super::env::{TaskContext, WorkerEnv};
use super::meta::{FactoryMetaTask, MetaTask, MetaTaskSpec};
use super::rating::RatingScore;
use super::task::{Task, TaskCore, TaskPhase};

const WORKING: TaskPhase = TaskPhase::new("Working");

/// Uses all the time it is given until its duration (if any) runs out.
#[derive(Debug)]
pub struct Steady {
    core: TaskCore,
    cleanups: Arc<AtomicUsize>,
}

impl Task for Steady {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn perform_phase(
        &mut self,
        _phase: TaskPhase,
        _time: f64,
        _ctx: &mut TaskContext<'_>,
    ) -> Result<f64, TaskError> {
        Ok(0.0)
    }

    fn clear_down(&mut self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}

/// Offers one job with a constant score.
#[derive(Debug)]
pub struct FixedPolicy {
    pub spec: MetaTaskSpec,
    pub score: f64,
    pub duration: f64,
    pub cleanups: Arc<AtomicUsize>,
}

impl FixedPolicy {
    pub fn new(spec: MetaTaskSpec, score: f64) -> Self {
        Self {
            spec,
            score,
            duration: 0.0,
            cleanups: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FactoryMetaTask for FixedPolicy {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, _env: &WorkerEnv<'_>) -> RatingScore {
        RatingScore::new("fixed", self.score)
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        Ok(Box::new(Steady {
            core: TaskCore::new(self.spec.name(), &env.worker.id, self.spec.name())
                .with_phases(&[WORKING])
                .with_duration(self.duration),
            cleanups: Arc::clone(&self.cleanups),
        }))
    }
}

pub fn policy_from_spec(spec: MetaTaskSpec, score: f64) -> MetaTask {
    MetaTask::factory(FixedPolicy::new(spec, score))
}

pub fn fixed_policy(id: &str, name: &str) -> MetaTask {
    policy_from_spec(MetaTaskSpec::new(id, name), 10.0)
}
