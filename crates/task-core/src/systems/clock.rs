//! Simulation Clock

use bevy_ecs::prelude::*;

use task_events::SimTime;

/// Default pulse length in millisols
pub const DEFAULT_PULSE: f64 = 1.0;

/// Mission time and the length of each pulse
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub time: SimTime,
    /// Millisols handed to every worker per tick
    pub pulse: f64,
    pub ticks: u64,
}

impl SimClock {
    pub fn new(pulse: f64) -> Self {
        Self {
            time: SimTime::start(),
            pulse: pulse.max(0.0),
            ticks: 0,
        }
    }

    pub fn starting_at(mut self, time: SimTime) -> Self {
        self.time = time;
        self
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE)
    }
}

/// System: Move mission time forward by one pulse
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    let pulse = clock.pulse;
    clock.time.advance(pulse);
    clock.ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_rolls_over_sols() {
        let mut world = World::new();
        world.insert_resource(SimClock::new(400.0));
        let mut schedule = Schedule::default();
        schedule.add_systems(advance_clock);

        for _ in 0..3 {
            schedule.run(&mut world);
        }
        let clock = world.resource::<SimClock>();
        assert_eq!(clock.ticks, 3);
        assert_eq!(clock.time.sol, 2);
        assert!((clock.time.millisol - 200.0).abs() < 1e-9);
    }
}
