//! Colony Task Scheduling Engine
//!
//! Utility-based task selection for colony workers: task policies score
//! candidate jobs, each worker's task manager caches the scores per tick,
//! draws one by weighted random selection and drives the resulting task
//! through its phases.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod scheduling;
pub mod setup;
pub mod systems;
pub mod tasks;

pub use components::*;
pub use config::SchedulerConfig;
pub use error::{ConfigError, ContextError, TaskError};
pub use scheduling::{SchedulerContext, SelectionOutcome, TaskManager};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
