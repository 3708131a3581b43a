//! Reading for leisure, off shift.

use task_events::WorkerId;

use crate::components::{FavoriteActivity, MAX_FATIGUE};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, DutyScope, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext,
    TaskCore, TaskPhase, TaskTrait, WorkerEnv, WorkerSupport,
};

const READING: TaskPhase = TaskPhase::new("Reading");

const BASE_SCORE: f64 = 20.0;
const READING_TIME: f64 = 40.0;

#[derive(Debug)]
pub struct ReadMeta {
    spec: MetaTaskSpec,
}

impl ReadMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("read", "Reading")
                .with_support(WorkerSupport::Person)
                .with_scope(DutyScope::NonWorkHour)
                .with_favorites(&[FavoriteActivity::Reading])
                .with_traits(&[TaskTrait::Relaxation]),
        }
    }
}

impl Default for ReadMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for ReadMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        if !env.worker.is_inside() {
            return RatingScore::zero();
        }
        let condition = &env.worker.condition;
        // Too tired to keep the eyes open
        let alertness = 1.0 - condition.fatigue / MAX_FATIGUE;
        let score = RatingScore::new("base", BASE_SCORE)
            .with_base("stress", condition.stress / 4.0)
            .with_modifier("alertness", alertness);
        modifiers::apply_standard(score, &self.spec, env)
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        Ok(Box::new(ReadTask::new(&env.worker.id)))
    }
}

#[derive(Debug)]
pub struct ReadTask {
    core: TaskCore,
}

impl ReadTask {
    pub fn new(worker: &WorkerId) -> Self {
        Self {
            core: TaskCore::new("Read", worker, "Reading")
                .with_phases(&[READING])
                .with_duration(READING_TIME),
        }
    }
}

impl Task for ReadTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn perform_phase(
        &mut self,
        _phase: TaskPhase,
        time: f64,
        ctx: &mut TaskContext<'_>,
    ) -> Result<f64, TaskError> {
        ctx.worker.condition.relieve_stress(time * 0.1);
        Ok(0.0)
    }
}
