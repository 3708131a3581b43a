//! Task Notification Types
//!
//! State-change notifications emitted by a worker's task manager whenever a
//! task is installed, changes phase or ends. Observers such as activity tables
//! consume these.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::SimTime;

/// Unique identifier for a worker
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Why a task stopped running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The task reached the end of its phase sequence
    Completed,
    /// The task ran for its full target duration
    DurationExhausted,
    /// A newly selected task replaced it
    Preempted,
    /// The owning worker died
    WorkerDied,
    /// The bound target (vehicle, building, ...) is no longer usable
    TargetInvalidated(String),
    /// The parent task ended, taking its sub-task with it
    ParentEnded,
    /// Cleared by an external caller
    Cleared(String),
    /// The task broke its own contract or could not be attached
    Failed(String),
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Completed => write!(f, "completed"),
            EndReason::DurationExhausted => write!(f, "duration exhausted"),
            EndReason::Preempted => write!(f, "preempted"),
            EndReason::WorkerDied => write!(f, "worker died"),
            EndReason::TargetInvalidated(why) => write!(f, "target invalidated: {}", why),
            EndReason::ParentEnded => write!(f, "parent task ended"),
            EndReason::Cleared(why) => write!(f, "cleared: {}", why),
            EndReason::Failed(why) => write!(f, "failed: {}", why),
        }
    }
}

/// Kind of state change carried by a [`TaskEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEventKind {
    /// A task was installed as the worker's current task
    Started,
    /// The current task (or one of its sub-tasks) moved to another phase
    PhaseChanged,
    /// The current task ended
    Ended { reason: EndReason },
}

/// A task state-change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub worker_id: WorkerId,
    #[serde(flatten)]
    pub kind: TaskEventKind,
    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phase: Option<String>,
    pub description: String,
    pub time: SimTime,
}

impl TaskEvent {
    pub fn new(
        worker_id: WorkerId,
        kind: TaskEventKind,
        task_name: impl Into<String>,
        phase: Option<String>,
        description: impl Into<String>,
        time: SimTime,
    ) -> Self {
        Self {
            worker_id,
            kind,
            task_name: task_name.into(),
            phase,
            description: description.into(),
            time,
        }
    }

    /// Returns true for task termination events.
    pub fn is_end(&self) -> bool {
        matches!(self.kind, TaskEventKind::Ended { .. })
    }

    /// Serializes the event to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
