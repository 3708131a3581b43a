//! Worker Components
//!
//! The state of an individual worker that task policies read when scoring and
//! tasks update while running. The physiological model itself lives outside
//! the scheduler; these are the accessors it exposes.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use task_events::{SimTime, WorkerId};

use crate::components::settlement::SettlementId;
use crate::config::EffortConfig;

/// Fatigue ceiling
pub const MAX_FATIGUE: f64 = 2000.0;
/// Stress ceiling
pub const MAX_STRESS: f64 = 100.0;
/// Hunger/thirst ceiling
pub const MAX_HUNGER: f64 = 2000.0;
/// Personal task preferences are clamped to `-MAX_PREFERENCE..=MAX_PREFERENCE`
pub const MAX_PREFERENCE: i32 = 5;

/// Whether the worker is a person or a robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    Person,
    Robot,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Person => write!(f, "person"),
            WorkerKind::Robot => write!(f, "robot"),
        }
    }
}

/// Shift status of a worker at the current instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OnDuty,
    #[default]
    OffDuty,
    OnCall,
}

impl DutyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DutyStatus::OnDuty => "on_duty",
            DutyStatus::OffDuty => "off_duty",
            DutyStatus::OnCall => "on_call",
        }
    }
}

/// Where the worker physically is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationState {
    #[default]
    InsideSettlement,
    InsideVehicle,
    Outside,
}

impl LocationState {
    /// Inside a pressurized habitat or vehicle
    pub fn is_inside(&self) -> bool {
        !self.is_unsheltered()
    }

    /// On the surface in a suit
    pub fn is_unsheltered(&self) -> bool {
        matches!(self, LocationState::Outside)
    }

    pub fn label(&self) -> &'static str {
        match self {
            LocationState::InsideSettlement => "inside",
            LocationState::InsideVehicle => "vehicle",
            LocationState::Outside => "outside",
        }
    }
}

/// Occupation of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Areologist,
    Botanist,
    Doctor,
    Engineer,
    Mechanic,
    Pilot,
    Scientist,
    Technician,
}

/// Activity categories a worker enjoys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteActivity {
    FieldWork,
    Reading,
    Research,
    Tinkering,
}

/// Physiological condition of a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// 0 (rested) to MAX_FATIGUE
    pub fatigue: f64,
    /// 0 to MAX_STRESS
    pub stress: f64,
    /// Millisols since the last meal, capped at MAX_HUNGER
    pub hunger: f64,
    pub thirst: f64,
    /// Stored food energy in kJ
    pub energy: f64,
    /// Performance rating, 0.0 to 1.0
    pub performance: f64,
    pub sick: bool,
    pub dead: bool,
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            fatigue: 100.0,
            stress: 10.0,
            hunger: 100.0,
            thirst: 100.0,
            energy: 5000.0,
            performance: 1.0,
            sick: false,
            dead: false,
        }
    }
}

impl Condition {
    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Converts millisols of physical effort into fatigue and energy cost.
    pub fn apply_effort(&mut self, effort: f64, config: &EffortConfig) {
        if effort <= 0.0 {
            return;
        }
        self.fatigue = (self.fatigue + effort * config.fatigue_per_millisol).min(MAX_FATIGUE);
        self.energy = (self.energy - effort * config.energy_per_millisol).max(0.0);
    }

    pub fn recover_fatigue(&mut self, amount: f64) {
        self.fatigue = (self.fatigue - amount).max(0.0);
    }

    pub fn relieve_stress(&mut self, amount: f64) {
        self.stress = (self.stress - amount).max(0.0);
    }

    /// Eating lowers hunger and thirst and restores energy.
    pub fn consume_meal(&mut self, amount: f64) {
        self.hunger = (self.hunger - amount).max(0.0);
        self.thirst = (self.thirst - amount).max(0.0);
        self.energy += amount * 2.0;
    }

    /// Recomputes the performance rating from the current needs.
    pub fn update_performance(&mut self) {
        let fatigue_penalty = ((self.fatigue - 1000.0) / 1000.0).clamp(0.0, 1.0) * 0.5;
        let hunger_penalty = ((self.hunger - 1000.0) / 1000.0).clamp(0.0, 1.0) * 0.3;
        let stress_penalty = ((self.stress - 50.0) / 50.0).clamp(0.0, 1.0) * 0.3;
        let sickness_penalty = if self.sick { 0.3 } else { 0.0 };
        self.performance =
            (1.0 - fatigue_penalty - hunger_penalty - stress_penalty - sickness_penalty)
                .clamp(0.0, 1.0);
    }
}

/// Work shift of a worker, in millisols of the sol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub start: f64,
    pub end: f64,
    pub on_call: bool,
}

impl Default for ShiftSchedule {
    fn default() -> Self {
        Self {
            start: 250.0,
            end: 750.0,
            on_call: false,
        }
    }
}

impl ShiftSchedule {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            on_call: false,
        }
    }

    pub fn on_call() -> Self {
        Self {
            on_call: true,
            ..Self::default()
        }
    }

    /// Duty status at `time`. Shifts may wrap past midnight.
    pub fn status_at(&self, time: SimTime) -> DutyStatus {
        if self.on_call {
            return DutyStatus::OnCall;
        }
        let now = time.millisol;
        let working = if self.start <= self.end {
            now >= self.start && now < self.end
        } else {
            now >= self.start || now < self.end
        };
        if working {
            DutyStatus::OnDuty
        } else {
            DutyStatus::OffDuty
        }
    }
}

/// A worker as seen by the scheduler
#[derive(Component, Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub kind: WorkerKind,
    pub duty: DutyStatus,
    pub location: LocationState,
    pub settlement: Option<SettlementId>,
    pub condition: Condition,
    pub job: Option<JobType>,
    pub favorites: Vec<FavoriteActivity>,
    /// Personal preference per task policy id, -5 to 5
    pub preferences: HashMap<String, i32>,
    pub mission: Option<String>,
    pub shift: ShiftSchedule,
}

impl Worker {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: WorkerKind) -> Self {
        Self {
            id: WorkerId::new(id),
            name: name.into(),
            kind,
            duty: DutyStatus::default(),
            location: LocationState::default(),
            settlement: None,
            condition: Condition::default(),
            job: None,
            favorites: Vec::new(),
            preferences: HashMap::new(),
            mission: None,
            shift: ShiftSchedule::default(),
        }
    }

    pub fn person(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, WorkerKind::Person)
    }

    pub fn robot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, WorkerKind::Robot)
    }

    pub fn with_duty(mut self, duty: DutyStatus) -> Self {
        self.duty = duty;
        self
    }

    pub fn with_location(mut self, location: LocationState) -> Self {
        self.location = location;
        self
    }

    pub fn with_settlement(mut self, settlement: SettlementId) -> Self {
        self.settlement = Some(settlement);
        self
    }

    pub fn with_job(mut self, job: JobType) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_favorite(mut self, favorite: FavoriteActivity) -> Self {
        self.favorites.push(favorite);
        self
    }

    pub fn with_preference(mut self, policy_id: impl Into<String>, value: i32) -> Self {
        self.preferences
            .insert(policy_id.into(), value.clamp(-MAX_PREFERENCE, MAX_PREFERENCE));
        self
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    pub fn with_shift(mut self, shift: ShiftSchedule) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_fatigue(mut self, fatigue: f64) -> Self {
        self.condition.fatigue = fatigue.clamp(0.0, MAX_FATIGUE);
        self
    }

    pub fn with_hunger(mut self, hunger: f64) -> Self {
        self.condition.hunger = hunger.clamp(0.0, MAX_HUNGER);
        self
    }

    pub fn with_stress(mut self, stress: f64) -> Self {
        self.condition.stress = stress.clamp(0.0, MAX_STRESS);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.condition.is_alive()
    }

    pub fn is_inside(&self) -> bool {
        self.location.is_inside()
    }

    pub fn has_favorite(&self, favorite: FavoriteActivity) -> bool {
        self.favorites.contains(&favorite)
    }

    /// Personal preference for a task policy, 0 if none recorded
    pub fn preference(&self, policy_id: &str) -> i32 {
        self.preferences.get(policy_id).copied().unwrap_or(0)
    }
}
