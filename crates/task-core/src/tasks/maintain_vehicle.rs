//! Vehicle maintenance. One candidate per vehicle that is due for service and
//! whose maintenance bay is free.

use std::sync::Arc;

use task_events::{EndReason, WorkerId};

use crate::components::{Gauge, JobType, SlotClaim, Vehicle, MAINTENANCE_THRESHOLD};
use crate::error::TaskError;
use crate::scheduling::{
    modifiers, DutyScope, MetaTaskSpec, RatingScore, SettlementMetaTask, Target, TargetScore,
    Task, TaskContext, TaskCore, TaskPhase, TaskTrait, WorkerEnv,
};

const MAINTAINING: TaskPhase = TaskPhase::new("Maintaining");

const BASE_SCORE: f64 = 25.0;
/// Wear removed per millisol of work at full performance
const SERVICE_RATE: f64 = 10.0;

#[derive(Debug)]
pub struct MaintainVehicleMeta {
    spec: MetaTaskSpec,
}

impl MaintainVehicleMeta {
    pub fn new() -> Self {
        Self {
            spec: MetaTaskSpec::new("maintain_vehicle", "Maintaining vehicle")
                .with_scope(DutyScope::WorkHour)
                .with_traits(&[TaskTrait::Technical])
                .with_preferred_jobs(&[JobType::Mechanic, JobType::Engineer, JobType::Technician]),
        }
    }
}

impl Default for MaintainVehicleMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementMetaTask for MaintainVehicleMeta {
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
            .vehicles
            .iter()
            .filter(|v| v.needs_maintenance() && v.garage_bay.open_to(&env.worker.id))
            .map(|vehicle| {
                let overdue = (vehicle.wear.get() - MAINTENANCE_THRESHOLD) / 20.0;
                let score = RatingScore::new("base", BASE_SCORE).with_base("overdue", overdue);
                TargetScore::new(
                    Target::Vehicle(vehicle.id.clone()),
                    format!("Maintaining {}", vehicle.name),
                    modifiers::apply_standard(score, &self.spec, env),
                )
            })
            .collect()
    }

    fn create_task(
        &self,
        env: &WorkerEnv<'_>,
        target: &Target,
    ) -> Result<Box<dyn Task>, TaskError> {
        let vehicle = match (target, env.settlement) {
            (Target::Vehicle(id), Some(settlement)) => settlement.vehicle(id),
            _ => None,
        }
        .ok_or_else(|| TaskError::TargetUnavailable {
            task: "Maintenance".to_string(),
            target: target.to_string(),
        })?;
        Ok(Box::new(MaintainVehicleTask::new(&env.worker.id, vehicle)?))
    }
}

#[derive(Debug)]
pub struct MaintainVehicleTask {
    core: TaskCore,
    vehicle_id: String,
    wear: Arc<Gauge>,
    bay: Option<SlotClaim>,
}

impl MaintainVehicleTask {
    pub fn new(worker: &WorkerId, vehicle: &Vehicle) -> Result<Self, TaskError> {
        let bay = vehicle
            .garage_bay
            .claim(worker)
            .ok_or_else(|| TaskError::ResourceUnavailable {
                task: "Maintenance".to_string(),
                resource: vehicle.garage_bay.name().to_string(),
            })?;
        Ok(Self {
            core: TaskCore::new("Maintenance", worker, format!("Maintaining {}", vehicle.name))
                .with_phases(&[MAINTAINING]),
            vehicle_id: vehicle.id.clone(),
            wear: Arc::clone(&vehicle.wear),
            bay: Some(bay),
        })
    }

    pub fn holds_bay(&self) -> bool {
        self.bay.is_some()
    }
}

impl Task for MaintainVehicleTask {
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
        let rate = SERVICE_RATE * ctx.worker.condition.performance.max(0.1);
        let needed = self.wear.get() / rate;
        if time >= needed {
            self.wear.reduce(self.wear.get());
            self.end_task(EndReason::Completed);
            return Ok(time - needed);
        }
        self.wear.reduce(time * rate);
        Ok(0.0)
    }

    fn check_validity(&self, ctx: &TaskContext<'_>) -> Option<EndReason> {
        let present = ctx
            .settlement
            .is_some_and(|s| s.vehicle(&self.vehicle_id).is_some());
        (!present).then(|| EndReason::TargetInvalidated(format!("vehicle {} left", self.vehicle_id)))
    }

    fn clear_down(&mut self) {
        self.bay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Settlement, Worker};
    use crate::config::SchedulerConfig;
    use task_events::SimTime;

    fn garage() -> Settlement {
        Settlement::new("base", "Base")
            .with_vehicle(Vehicle::new("v1", "Rover Alpha", 700.0))
            .with_vehicle(Vehicle::new("v2", "Rover Beta", 100.0))
    }

    #[test]
    fn test_one_candidate_per_due_vehicle() {
        let config = SchedulerConfig::default();
        let settlement = garage();
        let mechanic = Worker::person("w1", "Ana").with_job(JobType::Mechanic);
        let env = WorkerEnv::new(&mechanic, Some(&settlement), SimTime::start(), &config);

        let targets = MaintainVehicleMeta::new().targets(&env);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].target, Target::Vehicle("v1".into()));
        assert_eq!(targets[0].description, "Maintaining Rover Alpha");
        assert_eq!(targets[0].score.value(), 35.0);
    }

    #[test]
    fn test_busy_bay_rejected() {
        let config = SchedulerConfig::default();
        let settlement = garage();
        let ana = Worker::person("w1", "Ana");
        let ben = Worker::person("w2", "Ben");
        let meta = MaintainVehicleMeta::new();
        let target = Target::Vehicle("v1".into());

        let _first = meta
            .create_task(&WorkerEnv::new(&ana, Some(&settlement), SimTime::start(), &config), &target)
            .unwrap();
        let env = WorkerEnv::new(&ben, Some(&settlement), SimTime::start(), &config);
        assert!(meta.targets(&env).is_empty());
        assert!(matches!(
            meta.create_task(&env, &target),
            Err(TaskError::ResourceUnavailable { .. })
        ));
        assert!(matches!(
            meta.create_task(&env, &Target::Vehicle("v9".into())),
            Err(TaskError::TargetUnavailable { .. })
        ));
    }

    #[test]
    fn test_maintenance_resets_wear() {
        let settlement = garage();
        let mut worker = Worker::person("w1", "Ana");
        let vehicle = settlement.vehicle("v1").unwrap();
        let mut task = MaintainVehicleTask::new(&worker.id, vehicle).unwrap();
        let mut ctx = TaskContext::new(&mut worker, Some(&settlement), SimTime::start());

        task.perform(30.0, &mut ctx).unwrap();
        assert_eq!(vehicle.wear.get(), 400.0);
        let leftover = task.perform(60.0, &mut ctx).unwrap();
        assert!((leftover - 20.0).abs() < 1e-9);
        assert_eq!(vehicle.wear.get(), 0.0);
        assert!(!task.holds_bay());
        assert_eq!(vehicle.garage_bay.available(), 1);
    }

    #[test]
    fn test_departed_vehicle_invalidates_task() {
        let settlement = garage();
        let mut worker = Worker::person("w1", "Ana");
        let vehicle = settlement.vehicle("v1").unwrap();
        let mut task = MaintainVehicleTask::new(&worker.id, vehicle).unwrap();

        let elsewhere = Settlement::new("outpost", "Outpost");
        let mut ctx = TaskContext::new(&mut worker, Some(&elsewhere), SimTime::start());
        assert_eq!(task.perform(10.0, &mut ctx).unwrap(), 10.0);
        assert!(matches!(
            task.end_reason(),
            Some(EndReason::TargetInvalidated(_))
        ));
        assert_eq!(vehicle.garage_bay.available(), 1);
    }
}
