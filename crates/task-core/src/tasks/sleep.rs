//! Sleep. Robots use the same policy to power down and recharge.

use task_events::{EndReason, WorkerId};

use crate::components::DutyStatus;
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext, TaskCore,
    TaskPhase, TaskTrait, WorkerEnv,
};

const SLEEPING: TaskPhase = TaskPhase::new("Sleeping");

/// Fatigue below which nobody wants to sleep
const DROWSY_FATIGUE: f64 = 250.0;
/// Fatigue recovered per millisol asleep
const RECOVERY_RATE: f64 = 4.0;

#[derive(Debug)]
pub struct SleepMeta {
    spec: MetaTaskSpec,
}

impl SleepMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("sleep", "Sleeping").with_traits(&[TaskTrait::Passive]),
        }
    }
}

impl Default for SleepMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for SleepMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        if !env.worker.is_inside() {
            return RatingScore::zero();
        }
        let fatigue = env.worker.condition.fatigue;
        let duty = match env.worker.duty {
            DutyStatus::OffDuty => 2.0,
            DutyStatus::OnDuty => 0.25,
            DutyStatus::OnCall => 1.0,
        };
        RatingScore::new("fatigue", (fatigue - DROWSY_FATIGUE) / 4.0)
            .with_modifier("duty", duty)
            .with_modifier("preference", modifiers::preference(&self.spec, env))
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        Ok(Box::new(SleepTask::new(
            &env.worker.id,
            env.worker.condition.fatigue,
        )))
    }
}

#[derive(Debug)]
pub struct SleepTask {
    core: TaskCore,
}

impl SleepTask {
    pub fn new(worker: &WorkerId, fatigue: f64) -> Self {
        let duration = (fatigue / RECOVERY_RATE).clamp(60.0, 400.0);
        Self {
            core: TaskCore::new("Sleep", worker, "Sleeping")
                .with_phases(&[SLEEPING])
                .with_duration(duration),
        }
    }
}

impl Task for SleepTask {
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
        let condition = &mut ctx.worker.condition;
        condition.recover_fatigue(time * RECOVERY_RATE);
        condition.relieve_stress(time * 0.05);
        if condition.fatigue <= 0.0 {
            self.end_task(EndReason::Completed);
        }
        Ok(0.0)
    }
}
