//! Surface exploration on foot.
//!
//! The worker cycles through the airlock, explores for a while and comes back
//! in. A severe radiation event cuts the outing short: the explorer heads
//! straight for the airlock instead of staying out.

use task_events::{EndReason, WorkerId};

use crate::components::{FavoriteActivity, JobType, LocationState};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, DutyScope, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext,
    TaskCore, TaskPhase, TaskTrait, WorkerEnv, WorkerSupport,
};

const EXITING_AIRLOCK: TaskPhase = TaskPhase::new("Exiting airlock");
const EXPLORING: TaskPhase = TaskPhase::new("Exploring");
const ENTERING_AIRLOCK: TaskPhase = TaskPhase::new("Entering airlock");

const BASE_SCORE: f64 = 30.0;
const AIRLOCK_CYCLE: f64 = 5.0;
const OUTING_TIME: f64 = 100.0;

#[derive(Debug)]
pub struct ExploreMeta {
    spec: MetaTaskSpec,
}

impl ExploreMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("explore", "Exploring outside (EVA)")
                .with_support(WorkerSupport::Person)
                .with_scope(DutyScope::WorkHour)
                .with_favorites(&[FavoriteActivity::FieldWork])
                .with_traits(&[TaskTrait::Strength])
                .with_preferred_jobs(&[JobType::Areologist, JobType::Scientist]),
        }
    }
}

impl Default for ExploreMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for ExploreMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        if env.worker.location != LocationState::InsideSettlement {
            return RatingScore::zero();
        }
        let score = RatingScore::new("base", BASE_SCORE)
            .with_modifier("eva", modifiers::eva_fitness(env))
            .with_modifier("radiation", modifiers::radiation(env));
        modifiers::apply_standard(score, &self.spec, env)
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        if !env.airlock_reachable() {
            return Err(TaskError::Precondition {
                task: "Explore".to_string(),
                reason: "no operable airlock".to_string(),
            });
        }
        Ok(Box::new(ExploreTask::new(&env.worker.id)))
    }
}

#[derive(Debug)]
pub struct ExploreTask {
    core: TaskCore,
    cycled: f64,
    explored: f64,
}

impl ExploreTask {
    pub fn new(worker: &WorkerId) -> Self {
        Self {
            core: TaskCore::new("Explore", worker, "Exploring outside (EVA)").with_phases(&[
                EXITING_AIRLOCK,
                EXPLORING,
                ENTERING_AIRLOCK,
            ]),
            cycled: 0.0,
            explored: 0.0,
        }
    }

    /// Millisols spent on the surface so far
    pub fn explored(&self) -> f64 {
        self.explored
    }

    fn cycle_airlock(&mut self, time: f64) -> f64 {
        let step = time.min(AIRLOCK_CYCLE - self.cycled);
        self.cycled += step;
        time - step
    }
}

impl Task for ExploreTask {
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
        if phase == EXITING_AIRLOCK {
            let left = self.cycle_airlock(time);
            if self.cycled >= AIRLOCK_CYCLE {
                ctx.worker.location = LocationState::Outside;
                self.cycled = 0.0;
                self.core.set_phase(EXPLORING)?;
            }
            return Ok(left);
        }

        if phase == EXPLORING {
            let severe = ctx.settlement.is_some_and(|s| s.radiation.is_severe());
            let step = if severe {
                0.0
            } else {
                time.min(OUTING_TIME - self.explored)
            };
            self.explored += step;
            if severe || self.explored >= OUTING_TIME {
                self.core.set_phase(ENTERING_AIRLOCK)?;
            }
            return Ok(time - step);
        }

        let left = self.cycle_airlock(time);
        if self.cycled >= AIRLOCK_CYCLE {
            ctx.worker.location = LocationState::InsideSettlement;
            self.end_task(EndReason::Completed);
        }
        Ok(left)
    }
}
