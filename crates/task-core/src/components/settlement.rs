//! Settlement Components
//!
//! The parts of a settlement that task policies score against and tasks
//! reserve: labs, sick-bay beds, vehicles and buildings. Shared resources are
//! arbitrated by their owning [`SlotPool`]; a task claims a slot when it is
//! constructed and releases it from its cleanup hook.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use task_events::WorkerId;

/// Millisols of use after which a vehicle is due for maintenance
pub const MAINTENANCE_THRESHOLD: f64 = 500.0;

/// Unique identifier for a settlement
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub String);

impl SettlementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current space-weather radiation event over a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RadiationEvent {
    #[default]
    None,
    /// Galactic cosmic ray spike
    GalacticCosmicRay,
    /// Solar particle event
    SolarParticleEvent,
}

impl RadiationEvent {
    pub fn is_severe(&self) -> bool {
        matches!(self, RadiationEvent::SolarParticleEvent)
    }

    pub fn is_lesser(&self) -> bool {
        matches!(self, RadiationEvent::GalacticCosmicRay)
    }
}

/// A fixed number of exclusive slots (lab benches, sick-bay beds, ...).
#[derive(Debug)]
pub struct SlotPool {
    name: String,
    capacity: usize,
    holders: Mutex<Vec<WorkerId>>,
}

impl SlotPool {
    pub fn new(name: impl Into<String>, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            capacity,
            holders: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct workers holding a slot
    pub fn occupied(&self) -> usize {
        let holders = self.holders();
        holders
            .iter()
            .enumerate()
            .filter(|(i, worker)| !holders[..*i].contains(*worker))
            .count()
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.occupied())
    }

    pub fn is_held_by(&self, worker: &WorkerId) -> bool {
        self.holders().contains(worker)
    }

    /// True if `worker` could claim a slot: one is free or it already holds one.
    pub fn open_to(&self, worker: &WorkerId) -> bool {
        self.is_held_by(worker) || self.available() > 0
    }

    /// Claims one slot for `worker`. Returns `None` if the pool is full.
    ///
    /// A worker that already holds a slot gets a second claim on that same
    /// slot, so a replacement task can take over from the one it preempts.
    /// The slot stays held until both claims are dropped.
    pub fn claim(self: &Arc<Self>, worker: &WorkerId) -> Option<SlotClaim> {
        if !self.open_to(worker) {
            return None;
        }
        self.holders().push(worker.clone());
        Some(SlotClaim {
            pool: Arc::clone(self),
            worker: worker.clone(),
        })
    }

    fn release(&self, worker: &WorkerId) {
        let mut holders = self.holders();
        if let Some(index) = holders.iter().position(|holder| holder == worker) {
            holders.remove(index);
        }
    }

    fn holders(&self) -> MutexGuard<'_, Vec<WorkerId>> {
        self.holders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held slot. The slot is returned to its pool when the claim is dropped.
#[derive(Debug)]
pub struct SlotClaim {
    pool: Arc<SlotPool>,
    worker: WorkerId,
}

impl SlotClaim {
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }
}

impl Drop for SlotClaim {
    fn drop(&mut self) {
        self.pool.release(&self.worker);
    }
}

/// A shared scalar that tasks wear down while working (vehicle wear,
/// remaining repair work).
#[derive(Debug, Default)]
pub struct Gauge(Mutex<f64>);

impl Gauge {
    pub fn new(value: f64) -> Arc<Self> {
        Arc::new(Self(Mutex::new(value)))
    }

    pub fn get(&self) -> f64 {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lowers the value, never below zero. Returns the new value.
    pub fn reduce(&self, amount: f64) -> f64 {
        let mut value = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *value = (*value - amount).max(0.0);
        *value
    }

    pub fn increase(&self, amount: f64) {
        let mut value = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *value += amount.max(0.0);
    }
}

/// A vehicle parked at a settlement
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    /// Millisols of use since the last service
    pub wear: Arc<Gauge>,
    pub garage_bay: Arc<SlotPool>,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, name: impl Into<String>, wear: f64) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            garage_bay: SlotPool::new(format!("{} maintenance bay", name), 1),
            name,
            wear: Gauge::new(wear),
        }
    }

    pub fn needs_maintenance(&self) -> bool {
        self.wear.get() > MAINTENANCE_THRESHOLD
    }
}

/// An active malfunction in a building
#[derive(Debug, Clone)]
pub struct Malfunction {
    pub name: String,
    /// 0 to 100
    pub severity: f64,
    /// Millisols of work left before the malfunction is fixed
    pub remaining_work: Arc<Gauge>,
}

impl Malfunction {
    pub fn new(name: impl Into<String>, severity: f64, work: f64) -> Self {
        Self {
            name: name.into(),
            severity: severity.clamp(0.0, 100.0),
            remaining_work: Gauge::new(work),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.remaining_work.get() <= 0.0
    }
}

/// A settlement building
#[derive(Debug, Clone)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub occupants: u32,
    pub capacity: u32,
    /// Average opinion of the occupants toward newcomers, 0 to 100
    pub opinion: f64,
    pub malfunction: Option<Malfunction>,
    pub repair_crew: Arc<SlotPool>,
}

impl Building {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            repair_crew: SlotPool::new(format!("{} repair crew", name), 2),
            name,
            occupants: 0,
            capacity,
            opinion: 50.0,
            malfunction: None,
        }
    }

    pub fn with_occupants(mut self, occupants: u32) -> Self {
        self.occupants = occupants;
        self
    }

    pub fn with_opinion(mut self, opinion: f64) -> Self {
        self.opinion = opinion.clamp(0.0, 100.0);
        self
    }

    pub fn with_malfunction(mut self, malfunction: Malfunction) -> Self {
        self.malfunction = Some(malfunction);
        self
    }

    /// The malfunction still needing work, if any
    pub fn active_malfunction(&self) -> Option<&Malfunction> {
        self.malfunction.as_ref().filter(|m| !m.is_fixed())
    }
}

/// A settlement and everything its workers can reserve
#[derive(Debug, Clone)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    pub airlocks_operable: u32,
    pub daylight: bool,
    pub radiation: RadiationEvent,
    pub labs: Arc<SlotPool>,
    pub sick_bay: Arc<SlotPool>,
    pub vehicles: Vec<Vehicle>,
    pub buildings: Vec<Building>,
    /// Settlement-wide weighting per task policy id (default 1.0)
    pub task_weights: HashMap<String, f64>,
}

impl Settlement {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: SettlementId::new(id),
            name: name.into(),
            airlocks_operable: 1,
            daylight: true,
            radiation: RadiationEvent::None,
            labs: SlotPool::new("research lab", 2),
            sick_bay: SlotPool::new("sick bay", 1),
            vehicles: Vec::new(),
            buildings: Vec::new(),
            task_weights: HashMap::new(),
        }
    }

    pub fn with_airlocks(mut self, operable: u32) -> Self {
        self.airlocks_operable = operable;
        self
    }

    pub fn with_daylight(mut self, daylight: bool) -> Self {
        self.daylight = daylight;
        self
    }

    pub fn with_radiation(mut self, radiation: RadiationEvent) -> Self {
        self.radiation = radiation;
        self
    }

    pub fn with_labs(mut self, benches: usize) -> Self {
        self.labs = SlotPool::new("research lab", benches);
        self
    }

    pub fn with_sick_bay(mut self, beds: usize) -> Self {
        self.sick_bay = SlotPool::new("sick bay", beds);
        self
    }

    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicles.push(vehicle);
        self
    }

    pub fn with_building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    pub fn with_task_weight(mut self, policy_id: impl Into<String>, weight: f64) -> Self {
        self.task_weights.insert(policy_id.into(), weight.max(0.0));
        self
    }

    pub fn airlock_available(&self) -> bool {
        self.airlocks_operable > 0
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn task_weight(&self, policy_id: &str) -> f64 {
        self.task_weights.get(policy_id).copied().unwrap_or(1.0)
    }
}

/// All settlements in the simulation
#[derive(Resource, Debug, Default)]
pub struct Settlements(pub HashMap<SettlementId, Settlement>);

impl Settlements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, settlement: Settlement) {
        self.0.insert(settlement.id.clone(), settlement);
    }

    pub fn get(&self, id: &SettlementId) -> Option<&Settlement> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &SettlementId) -> Option<&mut Settlement> {
        self.0.get_mut(id)
    }
}
