//! Needs and Duty Systems
//!
//! A deliberately small physiological model: just enough drift for the
//! sleep, eat and read policies to have something to respond to.

use bevy_ecs::prelude::*;

use crate::components::{Worker, WorkerKind, MAX_FATIGUE, MAX_HUNGER};

use super::clock::SimClock;

/// Per-millisol drift of worker needs
#[derive(Resource, Debug, Clone)]
pub struct NeedRates {
    pub fatigue: f64,
    pub hunger: f64,
    pub thirst: f64,
}

impl Default for NeedRates {
    fn default() -> Self {
        Self {
            fatigue: 0.6,
            hunger: 0.8,
            thirst: 0.9,
        }
    }
}

/// System: Set each worker's duty status from their shift
pub fn update_duty_status(clock: Res<SimClock>, mut query: Query<&mut Worker>) {
    for mut worker in query.iter_mut() {
        let status = worker.shift.status_at(clock.time);
        // Only touch the component when the status actually flips
        if worker.duty != status {
            worker.duty = status;
        }
    }
}

/// System: Drift needs by one pulse and recompute performance
///
/// Robots get tired (their battery runs down) but never hungry.
pub fn drift_needs(clock: Res<SimClock>, rates: Res<NeedRates>, mut query: Query<&mut Worker>) {
    let pulse = clock.pulse;
    for mut worker in query.iter_mut() {
        if !worker.is_alive() {
            continue;
        }
        let is_person = worker.kind == WorkerKind::Person;
        let condition = &mut worker.condition;
        condition.fatigue = (condition.fatigue + pulse * rates.fatigue).min(MAX_FATIGUE);
        if is_person {
            condition.hunger = (condition.hunger + pulse * rates.hunger).min(MAX_HUNGER);
            condition.thirst = (condition.thirst + pulse * rates.thirst).min(MAX_HUNGER);
        }
        condition.update_performance();
    }
}
