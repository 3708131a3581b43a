//! Scheduling Engine
//!
//! Utility-based task selection: policies score candidate jobs, a per-tick
//! cache holds them, and each worker's [`TaskManager`] draws one with
//! probability proportional to its score and runs it.

pub mod cache;
pub mod context;
pub mod env;
pub mod history;
pub mod job;
pub mod manager;
pub mod meta;
pub mod modifiers;
pub mod pending;
pub mod rating;
pub mod registry;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStamp, TaskCache};
pub use context::{FallbackCaches, SchedulerContext, FALLBACK_SCORE};
pub use env::{TaskContext, WorkerEnv};
pub use history::ActivityLog;
pub use job::TaskJob;
pub use manager::{ActiveTask, SelectionOutcome, TaskManager};
pub use meta::{
    DutyScope, FactoryMetaTask, MetaTask, MetaTaskSpec, SettlementMetaTask, Target, TargetScore,
    TaskTrait, WorkerSupport,
};
pub use pending::{PendingQueue, PendingRequest};
pub use rating::{RatingScore, MAX_SCORE};
pub use registry::MetaTaskRegistry;
pub use task::{Task, TaskCore, TaskPhase, MAX_SUBTASK_DEPTH};
