//! ECS Components
//!
//! Worker and settlement state read by the scheduler.

pub mod settlement;
pub mod worker;

pub use settlement::{
    Building, Gauge, Malfunction, RadiationEvent, Settlement, SettlementId, Settlements, SlotClaim,
    SlotPool, Vehicle, MAINTENANCE_THRESHOLD,
};
pub use worker::{
    Condition, DutyStatus, FavoriteActivity, JobType, LocationState, ShiftSchedule, Worker,
    WorkerKind, MAX_FATIGUE, MAX_HUNGER, MAX_PREFERENCE, MAX_STRESS,
};
