//! Malfunction repair. One candidate per building with an unfixed malfunction
//! and room on its repair crew. A repair ends early if someone else finishes
//! the job first.

use std::sync::Arc;

use task_events::{EndReason, WorkerId};

use crate::components::{Building, Gauge, JobType, SlotClaim};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, MetaTaskSpec, RatingScore, SettlementMetaTask, Target, TargetScore, Task,
    TaskContext, TaskCore, TaskPhase, TaskTrait, WorkerEnv,
};

const REPAIRING: TaskPhase = TaskPhase::new("Repairing");

#[derive(Debug)]
pub struct RepairMeta {
    spec: MetaTaskSpec,
}

impl RepairMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("repair", "Repairing malfunction")
                .with_traits(&[TaskTrait::Technical])
                .with_preferred_jobs(&[JobType::Engineer, JobType::Technician, JobType::Mechanic]),
        }
    }
}

impl Default for RepairMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementMetaTask for RepairMeta {
    fn spec(&self) -> &MetaTaskSpec {
        &self.spec
    }

    fn targets(&self, env: &WorkerEnv<'_>) -> Vec<TargetScore> {
        let Some(settlement) = env.settlement else {
            return Vec::new();
        };
        if !env.worker.is_inside() {
            return Vec::new();
        }
        settlement
            .buildings
            .iter()
            .filter(|b| b.repair_crew.open_to(&env.worker.id))
            .filter_map(|building| {
                let malfunction = building.active_malfunction()?;
                let score = RatingScore::new("severity", malfunction.severity * 2.0)
                    .with_modifier("building", modifiers::building(building, env));
                Some(TargetScore::new(
                    Target::Building(building.id.clone()),
                    format!("Repairing {} in {}", malfunction.name, building.name),
                    modifiers::apply_standard(score, &self.spec, env),
                ))
            })
            .collect()
    }

    fn create_task(
        &self,
        env: &WorkerEnv<'_>,
        target: &Target,
    ) -> Result<Box<dyn Task>, TaskError> {
        let building = match (target, env.settlement) {
            (Target::Building(id), Some(settlement)) => settlement.building(id),
            _ => None,
        }
        .ok_or_else(|| TaskError::TargetUnavailable {
            task: "Repair".to_string(),
            target: target.to_string(),
        })?;
        Ok(Box::new(RepairTask::new(&env.worker.id, building)?))
    }
}

#[derive(Debug)]
pub struct RepairTask {
    core: TaskCore,
    remaining_work: Arc<Gauge>,
    crew_slot: Option<SlotClaim>,
}

impl RepairTask {
    pub fn new(worker: &WorkerId, building: &Building) -> Result<Self, TaskError> {
        let malfunction =
            building
                .active_malfunction()
                .ok_or_else(|| TaskError::TargetUnavailable {
                    task: "Repair".to_string(),
                    target: format!("building:{}", building.id),
                })?;
        let crew_slot =
            building
                .repair_crew
                .claim(worker)
                .ok_or_else(|| TaskError::ResourceUnavailable {
                    task: "Repair".to_string(),
                    resource: building.repair_crew.name().to_string(),
                })?;
        let description = format!("Repairing {} in {}", malfunction.name, building.name);
        Ok(Self {
            core: TaskCore::new("Repair", worker, description).with_phases(&[REPAIRING]),
            remaining_work: Arc::clone(&malfunction.remaining_work),
            crew_slot: Some(crew_slot),
        })
    }

    pub fn on_crew(&self) -> bool {
        self.crew_slot.is_some()
    }
}

impl Task for RepairTask {
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
        let skill = ctx.worker.condition.performance.max(0.1);
        let needed = self.remaining_work.get() / skill;
        if time >= needed {
            self.remaining_work.reduce(self.remaining_work.get());
            self.end_task(EndReason::Completed);
            return Ok(time - needed);
        }
        self.remaining_work.reduce(time * skill);
        Ok(0.0)
    }

    fn check_validity(&self, _ctx: &TaskContext<'_>) -> Option<EndReason> {
        (self.remaining_work.get() <= 0.0)
            .then(|| EndReason::TargetInvalidated("malfunction already fixed".to_string()))
    }

    fn clear_down(&mut self) {
        self.crew_slot = None;
    }
}
