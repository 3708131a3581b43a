//! Task Scheduling System
//!
//! Hands every worker's task manager one pulse of time. Workers are visited
//! in query order, which is stable for a given spawn order, so a seeded run
//! replays exactly.

use bevy_ecs::prelude::*;

use crate::components::{Settlements, Worker};
use crate::scheduling::TaskManager;
use crate::SimRng;

use super::clock::SimClock;

/// System: Select and run tasks for every worker
pub fn advance_task_managers(
    clock: Res<SimClock>,
    settlements: Res<Settlements>,
    mut rng: ResMut<SimRng>,
    mut query: Query<(&mut Worker, &mut TaskManager)>,
) {
    for (mut worker, mut manager) in query.iter_mut() {
        let settlement = worker
            .settlement
            .as_ref()
            .and_then(|id| settlements.get(id));
        let before = manager.task_description().map(str::to_string);

        manager.advance(&mut worker, settlement, clock.time, clock.pulse, &mut rng.0);

        let after = manager.task_description();
        if after.is_some() && after != before.as_deref() {
            tracing::info!(
                worker = %worker.id,
                time = %clock.time,
                task = after.unwrap_or_default(),
                "task installed"
            );
        }
    }
}
