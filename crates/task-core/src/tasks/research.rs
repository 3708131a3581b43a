//! Research at a lab bench during work hours.
//!
//! A bench is claimed from the settlement's lab pool when the task is built and
//! released when it ends. The worker first walks to the lab.

use std::sync::Arc;

use task_events::WorkerId;

use crate::components::{FavoriteActivity, JobType, LocationState, SlotClaim, SlotPool};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, DutyScope, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext,
    TaskCore, TaskPhase, TaskTrait, WorkerEnv, WorkerSupport,
};

use super::walk::WalkTask;

const WALKING_TO_LAB: TaskPhase = TaskPhase::new("Walking to lab");
const RESEARCHING: TaskPhase = TaskPhase::new("Researching");

const BASE_SCORE: f64 = 40.0;
const WALK_TIME: f64 = 3.0;
const SESSION_TIME: f64 = 100.0;

#[derive(Debug)]
pub struct ResearchMeta {
    spec: MetaTaskSpec,
}

impl ResearchMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("research", "Researching")
                .with_support(WorkerSupport::Person)
                .with_scope(DutyScope::WorkHour)
                .with_favorites(&[FavoriteActivity::Research])
                .with_traits(&[TaskTrait::Academic])
                .with_preferred_jobs(&[
                    JobType::Scientist,
                    JobType::Botanist,
                    JobType::Areologist,
                    JobType::Doctor,
                ]),
        }
    }
}

impl Default for ResearchMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for ResearchMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        let Some(settlement) = env.settlement else {
            return RatingScore::zero();
        };
        if env.worker.location != LocationState::InsideSettlement
            || !settlement.labs.open_to(&env.worker.id)
        {
            return RatingScore::zero();
        }
        modifiers::apply_standard(RatingScore::new("base", BASE_SCORE), &self.spec, env)
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        let settlement = env.settlement.ok_or_else(|| TaskError::Precondition {
            task: "Research".to_string(),
            reason: "not at a settlement".to_string(),
        })?;
        Ok(Box::new(ResearchTask::new(&env.worker.id, &settlement.labs)?))
    }
}

#[derive(Debug)]
pub struct ResearchTask {
    core: TaskCore,
    bench: Option<SlotClaim>,
    progress: f64,
}

impl ResearchTask {
    pub fn new(worker: &WorkerId, labs: &Arc<SlotPool>) -> Result<Self, TaskError> {
        let bench = labs.claim(worker).ok_or_else(|| TaskError::ResourceUnavailable {
            task: "Research".to_string(),
            resource: labs.name().to_string(),
        })?;
        Ok(Self {
            core: TaskCore::new("Research", worker, "Researching")
                .with_phases(&[WALKING_TO_LAB, RESEARCHING])
                .with_duration(SESSION_TIME),
            bench: Some(bench),
            progress: 0.0,
        })
    }

    /// Millisols of actual research done
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn holds_bench(&self) -> bool {
        self.bench.is_some()
    }
}

impl Task for ResearchTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn perform_phase(
        &mut self,
        phase: TaskPhase,
        time: f64,
        ctx: &mut TaskContext<'_>,
    ) -> Result<f64, TaskError> {
        if phase == WALKING_TO_LAB {
            let walk = WalkTask::new(self.core.worker(), "lab", WALK_TIME);
            self.add_sub_task(Box::new(walk))?;
            self.core.set_phase(RESEARCHING)?;
            return Ok(time);
        }
        self.progress += time * ctx.worker.condition.performance;
        Ok(0.0)
    }

    fn clear_down(&mut self) {
        self.bench = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Settlement, Worker};
    use crate::config::SchedulerConfig;
    use task_events::{EndReason, SimTime};

    #[test]
    fn test_scored_only_with_a_free_bench() {
        let config = SchedulerConfig::default();
        let meta = ResearchMeta::new();
        let scientist = Worker::person("w1", "Ana").with_job(JobType::Scientist);
        let open = Settlement::new("base", "Base");
        let closed = Settlement::new("base", "Base").with_labs(0);

        let env = WorkerEnv::new(&scientist, Some(&open), SimTime::start(), &config);
        assert_eq!(meta.score(&env).value(), BASE_SCORE);
        let env = WorkerEnv::new(&scientist, Some(&closed), SimTime::start(), &config);
        assert!(!meta.score(&env).is_positive());
        let env = WorkerEnv::new(&scientist, None, SimTime::start(), &config);
        assert!(!meta.score(&env).is_positive());
    }

    #[test]
    fn test_bench_claimed_and_released() {
        let settlement = Settlement::new("base", "Base").with_labs(1);
        let ana = Worker::person("w1", "Ana");
        let ben = Worker::person("w2", "Ben");

        let mut task = ResearchTask::new(&ana.id, &settlement.labs).unwrap();
        assert_eq!(settlement.labs.available(), 0);

        let err = ResearchTask::new(&ben.id, &settlement.labs).unwrap_err();
        assert!(matches!(err, TaskError::ResourceUnavailable { .. }));

        task.end_task(EndReason::Preempted);
        assert!(!task.holds_bench());
        assert_eq!(settlement.labs.available(), 1);
    }

    #[test]
    fn test_walks_before_researching() {
        let settlement = Settlement::new("base", "Base");
        let mut worker = Worker::person("w1", "Ana");
        let mut task = ResearchTask::new(&worker.id, &settlement.labs).unwrap();
        let mut ctx = TaskContext::new(&mut worker, Some(&settlement), SimTime::start());

        task.perform(2.0, &mut ctx).unwrap();
        assert_eq!(task.active_description(), "Walking to lab");
        assert_eq!(task.progress(), 0.0);

        task.perform(11.0, &mut ctx).unwrap();
        assert!(task.sub_task().is_none());
        assert!((task.progress() - 10.0).abs() < 1e-9);
    }
}
