//! Task Listeners
//!
//! Observers registered on a task manager receive a [`TaskEvent`] whenever a
//! task starts, changes phase or ends.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use task_events::TaskEvent;

use super::logger::JsonlLogger;

/// Receives task state changes.
pub trait TaskListener: Send + Sync {
    fn on_task_event(&self, event: &TaskEvent);
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct TaskEventLog {
    events: Mutex<Vec<TaskEvent>>,
}

impl TaskEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far
    pub fn events(&self) -> Vec<TaskEvent> {
        self.lock().clone()
    }

    pub fn drain(&self) -> Vec<TaskEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TaskEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskListener for TaskEventLog {
    fn on_task_event(&self, event: &TaskEvent) {
        self.lock().push(event.clone());
    }
}

/// Streams events to a JSONL file.
#[derive(Debug)]
pub struct JsonlTaskSink {
    logger: Mutex<JsonlLogger>,
}

impl JsonlTaskSink {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            logger: Mutex::new(JsonlLogger::new(path)?),
        })
    }

    pub fn record_count(&self) -> u64 {
        self.lock().record_count()
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.lock().flush()
    }

    fn lock(&self) -> MutexGuard<'_, JsonlLogger> {
        self.logger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskListener for JsonlTaskSink {
    fn on_task_event(&self, event: &TaskEvent) {
        if let Err(e) = self.lock().log(event) {
            tracing::warn!(worker = %event.worker_id, "failed to write task event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_events::{SimTime, TaskEventKind, WorkerId};

    fn started(worker: &str) -> TaskEvent {
        TaskEvent::new(
            WorkerId::new(worker),
            TaskEventKind::Started,
            "Read",
            Some("Reading".into()),
            "Reading",
            SimTime::start(),
        )
    }

    #[test]
    fn test_event_log_collects_and_drains() {
        let log = TaskEventLog::new();
        log.on_task_event(&started("w1"));
        log.on_task_event(&started("w2"));
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained[1].worker_id, WorkerId::new("w2"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_jsonl_sink_counts_records() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlTaskSink::new(dir.path().join("tasks.jsonl")).unwrap();
        sink.on_task_event(&started("w1"));
        sink.flush().unwrap();
        assert_eq!(sink.record_count(), 1);

        let text = std::fs::read_to_string(dir.path().join("tasks.jsonl")).unwrap();
        assert!(text.contains("\"type\":\"started\""));
    }
}
