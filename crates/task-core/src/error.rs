//! Error types for the scheduling engine.

use thiserror::Error;

/// Errors raised by task policies, task factories and the task state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// Execution was requested while no phase is active
    #[error("task '{task}' has no active phase")]
    NoPhase { task: String },

    /// A phase was requested that the task never declared
    #[error("task '{task}' does not declare phase '{phase}'")]
    UndeclaredPhase { task: String, phase: String },

    /// Attaching a sub-task would nest deeper than allowed
    #[error("sub-task '{task}' would exceed the nesting limit of {limit}")]
    SubTaskDepthExceeded { task: String, limit: usize },

    /// An exclusively held resource could not be claimed
    #[error("{resource} is not available for {task}")]
    ResourceUnavailable { task: String, resource: String },

    /// The target bound at scoring time disappeared before instantiation
    #[error("target {target} is no longer valid for {task}")]
    TargetUnavailable { task: String, target: String },

    /// The worker no longer satisfies a precondition of the task
    #[error("{task} cannot start: {reason}")]
    Precondition { task: String, reason: String },

    #[error("unknown task policy '{0}'")]
    UnknownPolicy(String),

    #[error("task policy '{0}' is already registered")]
    DuplicatePolicy(String),

    #[error("task policy '{policy}' does not support {kind} workers")]
    UnsupportedWorker { policy: String, kind: String },
}

impl TaskError {
    /// Returns true for errors raised by a malformed task implementation
    /// rather than by the state of the world.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            TaskError::NoPhase { .. }
                | TaskError::UndeclaredPhase { .. }
                | TaskError::SubTaskDepthExceeded { .. }
        )
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors that can occur while constructing a scheduler context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open diagnostics sink: {0}")]
    Diagnostics(#[from] std::io::Error),
}
