//! Getting a worker stranded outside back under a roof.
//!
//! Scores very high whenever the worker is outside and an airlock can be
//! reached. The same policy backs the outdoor fallback cache, so the task
//! must be constructible even when no airlock works; it then waits at the
//! door until one does.

use task_events::{EndReason, WorkerId};

use crate::components::LocationState;
use crate::error::TaskError;
use crate::scheduling::{
    FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext, TaskCore, TaskPhase,
    WorkerEnv,
};

const WALKING_TO_AIRLOCK: TaskPhase = TaskPhase::new("Walking to airlock");
const ENTERING_AIRLOCK: TaskPhase = TaskPhase::new("Entering airlock");

const URGENT_SCORE: f64 = 1000.0;
const WALK_TIME: f64 = 3.0;
const AIRLOCK_CYCLE: f64 = 5.0;

#[derive(Debug)]
pub struct ReturnInsideMeta {
    spec: MetaTaskSpec,
}

impl ReturnInsideMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("return_inside", "Return inside"),
        }
    }
}

impl Default for ReturnInsideMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for ReturnInsideMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        if env.worker.location.is_unsheltered() && env.airlock_reachable() {
            RatingScore::new("outside", URGENT_SCORE)
        } else {
            RatingScore::zero()
        }
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        Ok(Box::new(ReturnInsideTask::new(&env.worker.id)))
    }
}

#[derive(Debug)]
pub struct ReturnInsideTask {
    core: TaskCore,
    walked: f64,
    cycled: f64,
}

impl ReturnInsideTask {
    pub fn new(worker: &WorkerId) -> Self {
        Self {
            core: TaskCore::new("ReturnInside", worker, "Returning inside")
                .with_phases(&[WALKING_TO_AIRLOCK, ENTERING_AIRLOCK]),
            walked: 0.0,
            cycled: 0.0,
        }
    }
}

impl Task for ReturnInsideTask {
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
        if ctx.worker.location.is_inside() {
            self.end_task(EndReason::Completed);
            return Ok(time);
        }

        if phase == WALKING_TO_AIRLOCK {
            let step = time.min(WALK_TIME - self.walked);
            self.walked += step;
            if self.walked >= WALK_TIME {
                self.core.set_phase(ENTERING_AIRLOCK)?;
            }
            return Ok(time - step);
        }

        // Wait at the door until an airlock is back in service
        if !ctx.settlement.is_some_and(|s| s.airlock_available()) {
            return Ok(0.0);
        }
        let step = time.min(AIRLOCK_CYCLE - self.cycled);
        self.cycled += step;
        if self.cycled >= AIRLOCK_CYCLE {
            ctx.worker.location = LocationState::InsideSettlement;
            self.end_task(EndReason::Completed);
        }
        Ok(time - step)
    }
}
