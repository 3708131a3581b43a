//! Shared record types for the colony task scheduler.
//!
//! This crate contains pure data structures with no scheduling logic. Observers
//! (activity tables, offline analysis tools) depend on it without pulling in the
//! engine itself.

pub mod diagnostics;
pub mod event;
pub mod history;
pub mod timestamp;

// Re-export timestamp types
pub use timestamp::{ParseTimeError, SimTime, MILLISOLS_PER_SOL};

// Re-export event types
pub use event::{EndReason, TaskEvent, TaskEventKind, WorkerId};

pub use history::ActivityRecord;

pub use diagnostics::{CacheRecord, JobRecord};
