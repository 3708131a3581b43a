//! Task State Machine
//!
//! A task is a stateful activity bound to one worker. It runs through a
//! declared sequence of phases, may own a single nested sub-task, and ends
//! exactly once. Concrete tasks embed a [`TaskCore`] and implement
//! [`Task::perform_phase`]; the provided methods drive the phase loop,
//! sub-task delegation, duration accounting and termination.

use std::fmt;

use task_events::{EndReason, WorkerId};

use crate::error::TaskError;

use super::env::TaskContext;

/// Maximum number of sub-tasks nested below a root task
pub const MAX_SUBTASK_DEPTH: usize = 3;

const TIME_EPSILON: f64 = 1e-9;

/// Guard against phase functions that keep switching phase without using time
const MAX_PHASE_STEPS: usize = 32;

/// A named step of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskPhase(&'static str);

impl TaskPhase {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// State shared by every task implementation.
#[derive(Debug)]
pub struct TaskCore {
    name: String,
    worker: WorkerId,
    description: String,
    phases: Vec<TaskPhase>,
    phase: Option<TaskPhase>,
    elapsed: f64,
    /// Target duration in millisols; 0 means open-ended
    duration: f64,
    sub_task: Option<Box<dyn Task>>,
    done: bool,
    end_reason: Option<EndReason>,
    level: usize,
}

impl TaskCore {
    pub fn new(name: impl Into<String>, worker: &WorkerId, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            worker: worker.clone(),
            description: description.into(),
            phases: Vec::new(),
            phase: None,
            elapsed: 0.0,
            duration: 0.0,
            sub_task: None,
            done: false,
            end_reason: None,
            level: 0,
        }
    }

    pub fn with_phases(mut self, phases: &[TaskPhase]) -> Self {
        for phase in phases {
            self.add_phase(*phase);
        }
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration.max(0.0);
        self
    }

    /// Declares a phase. The first declared phase becomes the active one.
    pub fn add_phase(&mut self, phase: TaskPhase) {
        if !self.phases.contains(&phase) {
            self.phases.push(phase);
        }
        if self.phase.is_none() && !self.done {
            self.phase = Some(phase);
        }
    }

    /// Switches to a declared phase.
    pub fn set_phase(&mut self, phase: TaskPhase) -> Result<(), TaskError> {
        if !self.is_declared(phase) {
            return Err(TaskError::UndeclaredPhase {
                task: self.name.clone(),
                phase: phase.name().to_string(),
            });
        }
        self.phase = Some(phase);
        Ok(())
    }

    pub fn is_declared(&self, phase: TaskPhase) -> bool {
        self.phases.contains(&phase)
    }

    pub fn phase(&self) -> Option<TaskPhase> {
        self.phase
    }

    pub fn phases(&self) -> &[TaskPhase] {
        &self.phases
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn worker(&self) -> &WorkerId {
        &self.worker
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
    }

    /// Time left before the target duration runs out, `None` if open-ended
    pub fn remaining_duration(&self) -> Option<f64> {
        (self.duration > 0.0).then(|| (self.duration - self.elapsed).max(0.0))
    }

    fn duration_reached(&self) -> bool {
        self.duration > 0.0 && self.elapsed >= self.duration - TIME_EPSILON
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn end_reason(&self) -> Option<&EndReason> {
        self.end_reason.as_ref()
    }

    /// Nesting level; 0 for a root task
    pub fn level(&self) -> usize {
        self.level
    }
}

/// A stateful activity instance.
pub trait Task: fmt::Debug + Send + Sync {
    fn core(&self) -> &TaskCore;

    fn core_mut(&mut self) -> &mut TaskCore;

    /// Runs the active phase for up to `time` millisols and returns the time
    /// left over. The phase may switch phase, attach a sub-task or end the task.
    fn perform_phase(
        &mut self,
        phase: TaskPhase,
        time: f64,
        ctx: &mut TaskContext<'_>,
    ) -> Result<f64, TaskError>;

    /// Cleanup hook. Runs exactly once when the task ends; releases held
    /// resources.
    fn clear_down(&mut self) {}

    /// Checked before each execution step. Returning a reason ends the task.
    fn check_validity(&self, _ctx: &TaskContext<'_>) -> Option<EndReason> {
        None
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn description(&self) -> &str {
        self.core().description()
    }

    fn phase(&self) -> Option<TaskPhase> {
        self.core().phase()
    }

    fn is_done(&self) -> bool {
        self.core().is_done()
    }

    fn end_reason(&self) -> Option<&EndReason> {
        self.core().end_reason()
    }

    fn sub_task(&self) -> Option<&dyn Task> {
        self.core().sub_task.as_deref()
    }

    /// Length of the chain formed by this task and its sub-tasks
    fn depth(&self) -> usize {
        1 + self.sub_task().map_or(0, |sub| sub.depth())
    }

    /// Descriptions from this task down to its innermost sub-task
    fn descriptions(&self) -> Vec<&str> {
        let mut stack = vec![self.description()];
        if let Some(sub) = self.sub_task() {
            stack.extend(sub.descriptions());
        }
        stack
    }

    /// Descriptions and current phase names from this task down its chain
    fn activity_labels(&self) -> Vec<&str> {
        let mut labels = vec![self.description()];
        labels.extend(self.phase().map(|phase| phase.name()));
        if let Some(sub) = self.sub_task() {
            labels.extend(sub.activity_labels());
        }
        labels
    }

    /// Description of the innermost running task in the chain
    fn active_description(&self) -> &str {
        match self.sub_task() {
            Some(sub) if !sub.is_done() => sub.active_description(),
            _ => self.description(),
        }
    }

    /// Name and phase of the innermost running task in the chain
    fn active_phase(&self) -> (&str, Option<TaskPhase>) {
        match self.sub_task() {
            Some(sub) if !sub.is_done() => sub.active_phase(),
            _ => (self.name(), self.phase()),
        }
    }

    /// Spends up to `time` millisols on the task and returns the time left.
    fn perform(&mut self, time: f64, ctx: &mut TaskContext<'_>) -> Result<f64, TaskError> {
        if self.is_done() {
            return Ok(time);
        }
        if let Some(reason) = self.check_validity(ctx) {
            self.end_task(reason);
            return Ok(time);
        }

        let mut remaining = time.max(0.0);
        for _ in 0..MAX_PHASE_STEPS {
            if remaining <= TIME_EPSILON || self.is_done() {
                break;
            }
            if self.core().duration_reached() {
                self.end_task(EndReason::DurationExhausted);
                break;
            }

            // The sub-task runs first; its leftover only returns once it is done
            if let Some(sub) = self.core_mut().sub_task.as_mut() {
                if !sub.is_done() {
                    remaining = sub.perform(remaining, ctx)?;
                    if !sub.is_done() {
                        return Ok(remaining);
                    }
                }
            }
            if self.core().sub_task.is_some() {
                self.core_mut().sub_task = None;
                continue;
            }

            let phase = self.core().phase().ok_or_else(|| TaskError::NoPhase {
                task: self.name().to_string(),
            })?;
            if !self.core().is_declared(phase) {
                return Err(TaskError::UndeclaredPhase {
                    task: self.name().to_string(),
                    phase: phase.name().to_string(),
                });
            }

            let budget = self
                .core()
                .remaining_duration()
                .map_or(remaining, |left| remaining.min(left));
            let leftover = self.perform_phase(phase, budget, ctx)?.clamp(0.0, budget);
            let used = budget - leftover;
            self.core_mut().elapsed += used;
            remaining -= used;

            if !self.is_done() && self.core().duration_reached() {
                self.end_task(EndReason::DurationExhausted);
                break;
            }

            let moved = self.core().phase() != Some(phase) || self.core().sub_task.is_some();
            if used <= TIME_EPSILON && !moved {
                break;
            }
        }
        Ok(remaining)
    }

    /// Ends the task. The sub-task is ended first, then the cleanup hook runs.
    /// Later calls do nothing.
    fn end_task(&mut self, reason: EndReason) {
        if self.is_done() {
            return;
        }
        let core = self.core_mut();
        core.done = true;
        core.end_reason = Some(reason);
        if let Some(mut sub) = core.sub_task.take() {
            sub.end_task(EndReason::ParentEnded);
        }
        self.clear_down();
    }

    /// Attaches `task` below the innermost running sub-task.
    ///
    /// Returns `Ok(false)` when a task of the same name is already running
    /// there; the offered task is ended unused. A chain nested deeper than
    /// [`MAX_SUBTASK_DEPTH`] is rejected and the offered task ended.
    fn add_sub_task(&mut self, mut task: Box<dyn Task>) -> Result<bool, TaskError> {
        if self.is_done() {
            task.end_task(EndReason::ParentEnded);
            return Ok(false);
        }

        let level = self.core().level;
        if let Some(current) = self.core_mut().sub_task.as_mut() {
            if !current.is_done() {
                if current.name() == task.name() {
                    let why = format!("{} is already running", task.name());
                    task.end_task(EndReason::Failed(why));
                    return Ok(false);
                }
                return current.add_sub_task(task);
            }
        }

        if level + task.depth() > MAX_SUBTASK_DEPTH {
            let name = task.name().to_string();
            task.end_task(EndReason::Failed("nested too deep".to_string()));
            return Err(TaskError::SubTaskDepthExceeded {
                task: name,
                limit: MAX_SUBTASK_DEPTH,
            });
        }

        task.set_level(level + 1);
        self.core_mut().sub_task = Some(task);
        Ok(true)
    }

    #[doc(hidden)]
    fn set_level(&mut self, level: usize) {
        let core = self.core_mut();
        core.level = level;
        if let Some(sub) = core.sub_task.as_mut() {
            sub.set_level(level + 1);
        }
    }
}
