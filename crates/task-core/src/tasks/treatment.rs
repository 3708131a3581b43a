//! Self-treatment in the sick bay.

use std::sync::Arc;

use task_events::{EndReason, WorkerId};

use crate::components::{SlotClaim, SlotPool};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext, TaskCore,
    TaskPhase, TaskTrait, WorkerEnv, WorkerSupport,
};

const RESTING: TaskPhase = TaskPhase::new("Resting in sick bay");

const SICK_SCORE: f64 = 500.0;
const RECOVERY_TIME: f64 = 50.0;

#[derive(Debug)]
pub struct TreatmentMeta {
    spec: MetaTaskSpec,
}

impl TreatmentMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("treatment", "Seeking treatment")
                .with_support(WorkerSupport::Person)
                .with_traits(&[TaskTrait::Medical]),
        }
    }
}

impl Default for TreatmentMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for TreatmentMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        let bed_free = env.settlement.is_some_and(|s| s.sick_bay.open_to(&env.worker.id));
        if !env.worker.condition.sick || !env.worker.is_inside() || !bed_free {
            return RatingScore::zero();
        }
        RatingScore::new("sick", SICK_SCORE)
            .with_modifier("preference", modifiers::preference(&self.spec, env))
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        let settlement = env.settlement.ok_or_else(|| TaskError::Precondition {
            task: "Treatment".to_string(),
            reason: "no sick bay nearby".to_string(),
        })?;
        Ok(Box::new(TreatmentTask::new(
            &env.worker.id,
            &settlement.sick_bay,
        )?))
    }
}

#[derive(Debug)]
pub struct TreatmentTask {
    core: TaskCore,
    bed: Option<SlotClaim>,
}

impl TreatmentTask {
    pub fn new(worker: &WorkerId, sick_bay: &Arc<SlotPool>) -> Result<Self, TaskError> {
        let bed = sick_bay
            .claim(worker)
            .ok_or_else(|| TaskError::ResourceUnavailable {
                task: "Treatment".to_string(),
                resource: sick_bay.name().to_string(),
            })?;
        Ok(Self {
            core: TaskCore::new("Treatment", worker, "Resting in sick bay")
                .with_phases(&[RESTING])
                .with_duration(RECOVERY_TIME),
            bed: Some(bed),
        })
    }

    pub fn holds_bed(&self) -> bool {
        self.bed.is_some()
    }
}

impl Task for TreatmentTask {
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
        let remaining = self.core.remaining_duration().unwrap_or(0.0);
        if time >= remaining {
            let condition = &mut ctx.worker.condition;
            condition.sick = false;
            condition.update_performance();
            self.end_task(EndReason::Completed);
            return Ok(time - remaining);
        }
        Ok(0.0)
    }

    fn clear_down(&mut self) {
        self.bed = None;
    }
}
