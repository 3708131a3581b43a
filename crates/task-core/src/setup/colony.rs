//! Colony Spawning
//!
//! Builds the starting settlement and a crew with randomized jobs, favorites,
//! shifts and needs.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use rand::Rng;

use crate::components::{
    Building, FavoriteActivity, JobType, Malfunction, Settlement, SettlementId, ShiftSchedule,
    Vehicle, Worker,
};
use crate::events::TaskListener;
use crate::scheduling::{SchedulerContext, TaskManager};

const CREW_NAMES: &[&str] = &[
    "Ana", "Bao", "Chidi", "Dana", "Elif", "Farid", "Greta", "Hiro", "Ines", "Jonas",
    "Kavya", "Lars", "Mei", "Nadia", "Omar", "Priya", "Quinn", "Rosa", "Sven", "Tariq",
];

const JOBS: &[JobType] = &[
    JobType::Areologist,
    JobType::Botanist,
    JobType::Doctor,
    JobType::Engineer,
    JobType::Mechanic,
    JobType::Pilot,
    JobType::Scientist,
    JobType::Technician,
];

const FAVORITES: &[FavoriteActivity] = &[
    FavoriteActivity::FieldWork,
    FavoriteActivity::Reading,
    FavoriteActivity::Research,
    FavoriteActivity::Tinkering,
];

/// Shift windows in millisols; crew members are spread across them
const SHIFTS: &[(f64, f64)] = &[(250.0, 750.0), (750.0, 250.0)];

/// Every fourth crew member is a robot
const ROBOT_EVERY: usize = 4;

/// Creates the starting settlement: two rovers (one overdue for service)
/// and a handful of buildings, one with a leak.
pub fn create_settlement() -> Settlement {
    Settlement::new("schiaparelli", "Schiaparelli Base")
        .with_labs(2)
        .with_sick_bay(2)
        .with_building(Building::new("hab", "Habitat", 12).with_occupants(6))
        .with_building(
            Building::new("greenhouse", "Greenhouse", 6)
                .with_occupants(2)
                .with_opinion(60.0)
                .with_malfunction(Malfunction::new("Water leak", 40.0, 60.0)),
        )
        .with_building(Building::new("workshop", "Workshop", 4).with_occupants(1))
        .with_vehicle(Vehicle::new("rover_1", "Rover Opportunity", 650.0))
        .with_vehicle(Vehicle::new("rover_2", "Rover Spirit", 120.0))
}

/// Creates `count` crew members based at `settlement`.
pub fn create_workers<R: Rng + ?Sized>(
    count: usize,
    settlement: &SettlementId,
    rng: &mut R,
) -> Vec<Worker> {
    (0..count)
        .map(|i| {
            let id = format!("crew_{:03}", i);
            let (start, end) = SHIFTS[i % SHIFTS.len()];
            let base = if (i + 1) % ROBOT_EVERY == 0 {
                Worker::robot(id, format!("Unit {}", i))
            } else {
                let name = CREW_NAMES[i % CREW_NAMES.len()];
                Worker::person(id, name)
                    .with_job(JOBS[rng.gen_range(0..JOBS.len())])
                    .with_favorite(FAVORITES[rng.gen_range(0..FAVORITES.len())])
                    .with_preference("read", rng.gen_range(-3..=3))
                    .with_preference("research", rng.gen_range(-3..=3))
            };
            let mut worker = base
                .with_settlement(settlement.clone())
                .with_shift(ShiftSchedule::new(start, end))
                .with_fatigue(rng.gen_range(50.0..400.0))
                .with_hunger(rng.gen_range(50.0..400.0))
                .with_stress(rng.gen_range(5.0..30.0));
            worker.condition.update_performance();
            worker
        })
        .collect()
}

/// Spawns each worker with a task manager bound to `context`.
pub fn spawn_workers(
    world: &mut World,
    workers: Vec<Worker>,
    context: &Arc<SchedulerContext>,
    listeners: &[Arc<dyn TaskListener>],
) -> usize {
    let count = workers.len();
    for worker in workers {
        let mut manager = TaskManager::new(worker.id.clone(), Arc::clone(context));
        for listener in listeners {
            manager.add_listener(Arc::clone(listener));
        }
        world.spawn((worker, manager));
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::WorkerKind;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_settlement_has_work() {
        let settlement = create_settlement();
        assert!(settlement.vehicles.iter().any(|v| v.needs_maintenance()));
        assert!(settlement
            .buildings
            .iter()
            .any(|b| b.active_malfunction().is_some()));
    }

    #[test]
    fn test_crew_mix() {
        let settlement = create_settlement();
        let mut rng = SmallRng::seed_from_u64(42);
        let crew = create_workers(8, &settlement.id, &mut rng);

        assert_eq!(crew.len(), 8);
        let robots = crew.iter().filter(|w| w.kind == WorkerKind::Robot).count();
        assert_eq!(robots, 2);
        assert!(crew.iter().all(|w| w.settlement.as_ref() == Some(&settlement.id)));
        assert!(crew
            .iter()
            .filter(|w| w.kind == WorkerKind::Person)
            .all(|w| w.job.is_some()));
    }

    #[test]
    fn test_crew_is_seeded() {
        let settlement = create_settlement();
        let a = create_workers(6, &settlement.id, &mut SmallRng::seed_from_u64(9));
        let b = create_workers(6, &settlement.id, &mut SmallRng::seed_from_u64(9));
        let fatigue = |crew: &[Worker]| crew.iter().map(|w| w.condition.fatigue).collect::<Vec<_>>();
        assert_eq!(fatigue(&a), fatigue(&b));
    }
}
