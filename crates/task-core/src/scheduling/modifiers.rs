//! Score Modifiers
//!
//! Multipliers shared by all task policies. Each returns a factor to apply to
//! a base score; a factor of zero vetoes the candidate.

use crate::components::{Building, RadiationEvent};

use super::env::WorkerEnv;
use super::meta::MetaTaskSpec;
use super::rating::RatingScore;

/// Worker performance rating, 0.0 to 1.0
pub fn performance(env: &WorkerEnv<'_>) -> f64 {
    env.worker.condition.performance.clamp(0.0, 1.0)
}

/// Penalty for workers whose job the policy does not prefer
pub fn job(spec: &MetaTaskSpec, env: &WorkerEnv<'_>) -> f64 {
    if spec.prefers_job(env.worker.job) {
        1.0
    } else {
        env.scoring().non_preferred_job_penalty
    }
}

/// Personal preference, favorite activity and settlement weighting combined
pub fn preference(spec: &MetaTaskSpec, env: &WorkerEnv<'_>) -> f64 {
    let worker = env.worker;
    let mut factor = 1.0 + worker.preference(spec.id()) as f64 / 10.0;
    if spec.favorites().iter().any(|f| worker.has_favorite(*f)) {
        factor *= env.scoring().favorite_bonus;
    }
    if let Some(settlement) = env.settlement {
        factor *= settlement.task_weight(spec.id());
    }
    factor.max(0.0)
}

/// How far past comfortable occupancy a building is: 0 when comfortable,
/// ramping to 1 at capacity and beyond 1 when overfull.
pub fn overcrowding(building: &Building, comfort_ratio: f64) -> f64 {
    if building.capacity == 0 {
        return 1.0;
    }
    let ratio = building.occupants as f64 / building.capacity as f64;
    if ratio <= comfort_ratio {
        0.0
    } else if ratio <= 1.0 {
        (ratio - comfort_ratio) / (1.0 - comfort_ratio).max(f64::EPSILON)
    } else {
        1.0 + (ratio - 1.0)
    }
}

/// Crowding and the occupants' opinion of the worker combined
pub fn building(building: &Building, env: &WorkerEnv<'_>) -> f64 {
    let crowding = 1.0 / (1.0 + overcrowding(building, env.scoring().crowding_comfort_ratio));
    let relationship = 0.5 + building.opinion / 100.0;
    crowding * relationship
}

/// Outdoor work during a radiation event
pub fn radiation(env: &WorkerEnv<'_>) -> f64 {
    match env.settlement.map(|s| s.radiation) {
        Some(event) if event.is_severe() => 0.0,
        Some(RadiationEvent::GalacticCosmicRay) => env.scoring().lesser_radiation_modifier,
        _ => 1.0,
    }
}

/// Zero if the worker cannot or should not go outside right now
pub fn eva_fitness(env: &WorkerEnv<'_>) -> f64 {
    let scoring = env.scoring();
    let condition = &env.worker.condition;

    let usable = env.airlock_reachable() && env.settlement.is_some_and(|s| s.daylight);
    let fit = !condition.sick
        && condition.hunger <= scoring.eva_max_hunger
        && condition.fatigue <= scoring.eva_max_fatigue
        && condition.stress <= scoring.eva_max_stress
        && condition.performance >= scoring.eva_min_performance;

    if usable && fit {
        1.0
    } else {
        0.0
    }
}

/// Applies the performance, job and preference modifiers every policy uses.
pub fn apply_standard(score: RatingScore, spec: &MetaTaskSpec, env: &WorkerEnv<'_>) -> RatingScore {
    score
        .with_modifier("performance", performance(env))
        .with_modifier("job", job(spec, env))
        .with_modifier("preference", preference(spec, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{FavoriteActivity, JobType, Settlement, Worker};
    use crate::config::SchedulerConfig;
    use task_events::SimTime;

    fn env<'a>(
        worker: &'a Worker,
        settlement: Option<&'a Settlement>,
        config: &'a SchedulerConfig,
    ) -> WorkerEnv<'a> {
        WorkerEnv::new(worker, settlement, SimTime::new(1, 500.0), config)
    }

    #[test]
    fn test_job_penalty() {
        let config = SchedulerConfig::default();
        let spec = MetaTaskSpec::new("research", "Research").with_preferred_jobs(&[JobType::Scientist]);

        let scientist = Worker::person("w1", "Ana").with_job(JobType::Scientist);
        let pilot = Worker::person("w2", "Ben").with_job(JobType::Pilot);

        assert_eq!(job(&spec, &env(&scientist, None, &config)), 1.0);
        assert_eq!(job(&spec, &env(&pilot, None, &config)), 0.25);
    }

    #[test]
    fn test_preference_combines_factors() {
        let config = SchedulerConfig::default();
        let spec = MetaTaskSpec::new("read", "Reading").with_favorites(&[FavoriteActivity::Reading]);
        let settlement = Settlement::new("base", "Base").with_task_weight("read", 2.0);

        let worker = Worker::person("w1", "Ana")
            .with_preference("read", 5)
            .with_favorite(FavoriteActivity::Reading);
        let factor = preference(&spec, &env(&worker, Some(&settlement), &config));
        assert!((factor - 1.5 * 1.5 * 2.0).abs() < 1e-9);

        let reluctant = Worker::person("w2", "Ben").with_preference("read", -5);
        assert!((preference(&spec, &env(&reluctant, None, &config)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_overcrowding_ramp() {
        let comfortable = Building::new("b1", "Lounge", 10).with_occupants(5);
        let full = Building::new("b2", "Lounge", 10).with_occupants(10);
        let overfull = Building::new("b3", "Lounge", 10).with_occupants(15);

        assert_eq!(overcrowding(&comfortable, 0.7), 0.0);
        assert!((overcrowding(&full, 0.7) - 1.0).abs() < 1e-9);
        assert!((overcrowding(&overfull, 0.7) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_building_modifier() {
        let config = SchedulerConfig::default();
        let worker = Worker::person("w1", "Ana");
        let friendly = Building::new("b1", "Lab", 10).with_opinion(100.0);
        let crowded = Building::new("b2", "Lab", 10).with_occupants(10).with_opinion(50.0);

        assert!((building(&friendly, &env(&worker, None, &config)) - 1.5).abs() < 1e-9);
        assert!((building(&crowded, &env(&worker, None, &config)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_radiation() {
        let config = SchedulerConfig::default();
        let worker = Worker::person("w1", "Ana");
        let calm = Settlement::new("a", "A");
        let gcr = Settlement::new("b", "B").with_radiation(RadiationEvent::GalacticCosmicRay);
        let sep = Settlement::new("c", "C").with_radiation(RadiationEvent::SolarParticleEvent);

        assert_eq!(radiation(&env(&worker, Some(&calm), &config)), 1.0);
        assert_eq!(radiation(&env(&worker, Some(&gcr), &config)), 0.1);
        assert_eq!(radiation(&env(&worker, Some(&sep), &config)), 0.0);
    }

    #[test]
    fn test_eva_fitness_gate() {
        let config = SchedulerConfig::default();
        let settlement = Settlement::new("base", "Base");
        let dark = Settlement::new("base", "Base").with_daylight(false);
        let sealed = Settlement::new("base", "Base").with_airlocks(0);

        let fit = Worker::person("w1", "Ana");
        let tired = Worker::person("w2", "Ben").with_fatigue(1500.0);
        let hungry = Worker::person("w3", "Cy").with_hunger(800.0);

        assert_eq!(eva_fitness(&env(&fit, Some(&settlement), &config)), 1.0);
        assert_eq!(eva_fitness(&env(&fit, Some(&dark), &config)), 0.0);
        assert_eq!(eva_fitness(&env(&fit, Some(&sealed), &config)), 0.0);
        assert_eq!(eva_fitness(&env(&fit, None, &config)), 0.0);
        assert_eq!(eva_fitness(&env(&tired, Some(&settlement), &config)), 0.0);
        assert_eq!(eva_fitness(&env(&hungry, Some(&settlement), &config)), 0.0);
    }
}
