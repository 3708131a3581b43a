//! ECS Systems
//!
//! The per-tick pipeline: advance the clock, refresh duty status, drift
//! worker needs, then let every task manager select and run its task.

pub mod clock;
pub mod needs;
pub mod scheduling;

pub use clock::{advance_clock, SimClock};
pub use needs::{drift_needs, update_duty_status, NeedRates};
pub use scheduling::advance_task_managers;
