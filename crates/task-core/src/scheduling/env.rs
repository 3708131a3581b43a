//! Views of the world handed to task policies and running tasks.

use task_events::SimTime;

use crate::components::{Settlement, Worker};
use crate::config::{ScoringConfig, SchedulerConfig};

/// Read-only view used while scoring candidates and constructing tasks.
#[derive(Debug, Clone, Copy)]
pub struct WorkerEnv<'a> {
    pub worker: &'a Worker,
    pub settlement: Option<&'a Settlement>,
    pub time: SimTime,
    pub config: &'a SchedulerConfig,
}

impl<'a> WorkerEnv<'a> {
    pub fn new(
        worker: &'a Worker,
        settlement: Option<&'a Settlement>,
        time: SimTime,
        config: &'a SchedulerConfig,
    ) -> Self {
        Self {
            worker,
            settlement,
            time,
            config,
        }
    }

    pub fn scoring(&self) -> &'a ScoringConfig {
        &self.config.scoring
    }

    /// Label identifying the situation a cache was computed for
    pub fn context_label(&self) -> String {
        format!(
            "{}.{}",
            self.worker.duty.label(),
            self.worker.location.label()
        )
    }

    /// True if the worker's settlement has an operable airlock
    pub fn airlock_reachable(&self) -> bool {
        self.settlement.is_some_and(|s| s.airlock_available())
    }
}

/// Mutable view handed to a running task.
#[derive(Debug)]
pub struct TaskContext<'a> {
    pub worker: &'a mut Worker,
    pub settlement: Option<&'a Settlement>,
    pub time: SimTime,
}

impl<'a> TaskContext<'a> {
    pub fn new(worker: &'a mut Worker, settlement: Option<&'a Settlement>, time: SimTime) -> Self {
        Self {
            worker,
            settlement,
            time,
        }
    }
}
