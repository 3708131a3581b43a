//! Task notifications and JSONL sinks.

pub mod logger;
pub mod notify;

pub use logger::JsonlLogger;
pub use notify::{JsonlTaskSink, TaskEventLog, TaskListener};
