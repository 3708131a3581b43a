//! Walking sub-task used by tasks that have to move the worker first.

use task_events::{EndReason, WorkerId};

use crate::error::TaskError;
use crate::scheduling::{Task, TaskContext, TaskCore, TaskPhase};

pub const WALKING: TaskPhase = TaskPhase::new("Walking");

#[derive(Debug)]
pub struct WalkTask {
    core: TaskCore,
    distance: f64,
    walked: f64,
}

impl WalkTask {
    /// A walk to `destination` taking `millisols` of time
    pub fn new(worker: &WorkerId, destination: &str, millisols: f64) -> Self {
        Self {
            core: TaskCore::new("Walk", worker, format!("Walking to {}", destination))
                .with_phases(&[WALKING]),
            distance: millisols.max(0.0),
            walked: 0.0,
        }
    }
}

impl Task for WalkTask {
    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn perform_phase(
        &mut self,
        _phase: TaskPhase,
        time: f64,
        _ctx: &mut TaskContext<'_>,
    ) -> Result<f64, TaskError> {
        let step = time.min(self.distance - self.walked);
        self.walked += step;
        if self.walked >= self.distance {
            self.end_task(EndReason::Completed);
        }
        Ok(time - step)
    }
}
