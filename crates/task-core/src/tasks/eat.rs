//! Eating. People only.

use task_events::{EndReason, WorkerId};

use crate::error::TaskError;
use crate::scheduling::{
    modifiers, FactoryMetaTask, MetaTaskSpec, RatingScore, Task, TaskContext, TaskCore,
    TaskPhase, TaskTrait, WorkerEnv, WorkerSupport,
};

const LOOKING_FOR_FOOD: TaskPhase = TaskPhase::new("Looking for food");
const EATING: TaskPhase = TaskPhase::new("Eating");

/// Hunger below which a meal is not wanted
const PECKISH: f64 = 250.0;
const SEARCH_TIME: f64 = 2.0;
const MEAL_TIME: f64 = 30.0;
/// Hunger removed per millisol of eating
const MEAL_RATE: f64 = 20.0;

#[derive(Debug)]
pub struct EatMeta {
    spec: MetaTaskSpec,
}

impl EatMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("eat", "Eating")
                .with_support(WorkerSupport::Person)
                .with_traits(&[TaskTrait::Passive]),
        }
    }
}

impl Default for EatMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FactoryMetaTask for EatMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore {
        if !env.worker.is_inside() {
            return RatingScore::zero();
        }
        let condition = &env.worker.condition;
        let hunger = (condition.hunger - PECKISH).max(0.0) / 4.0;
        let thirst = (condition.thirst - PECKISH).max(0.0) / 10.0;
        RatingScore::new("hunger", hunger)
            .with_base("thirst", thirst)
            .with_modifier("preference", modifiers::preference(&self.spec, env))
    }

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        Ok(Box::new(EatTask::new(&env.worker.id)))
    }
}

#[derive(Debug)]
pub struct EatTask {
    core: TaskCore,
    searched: f64,
    eaten: f64,
}

impl EatTask {
    pub fn new(worker: &WorkerId) -> Self {
        Self {
            core: TaskCore::new("Eat", worker, "Eating")
                .with_phases(&[LOOKING_FOR_FOOD, EATING]),
            searched: 0.0,
            eaten: 0.0,
        }
    }
}

impl Task for EatTask {
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
        if phase == LOOKING_FOR_FOOD {
            let step = time.min(SEARCH_TIME - self.searched);
            self.searched += step;
            if self.searched >= SEARCH_TIME {
                self.core.set_phase(EATING)?;
            }
            return Ok(time - step);
        }

        let step = time.min(MEAL_TIME - self.eaten);
        self.eaten += step;
        let condition = &mut ctx.worker.condition;
        condition.consume_meal(step * MEAL_RATE);
        if self.eaten >= MEAL_TIME || condition.hunger <= 0.0 {
            self.end_task(EndReason::Completed);
        }
        Ok(time - step)
    }
}
