//! Task Library
//!
//! The concrete task policies and the tasks they build. Factory policies score
//! a single candidate; settlement policies score one candidate per target
//! (vehicle or building).

pub mod eat;
pub mod explore;
pub mod maintain_vehicle;
pub mod read;
pub mod repair;
pub mod research;
pub mod return_inside;
pub mod sleep;
pub mod treatment;
pub mod walk;

pub use eat::{EatMeta, EatTask};
pub use explore::{ExploreMeta, ExploreTask};
pub use maintain_vehicle::{MaintainVehicleMeta, MaintainVehicleTask};
pub use read::{ReadMeta, ReadTask};
pub use repair::{RepairMeta, RepairTask};
pub use research::{ResearchMeta, ResearchTask};
pub use return_inside::{ReturnInsideMeta, ReturnInsideTask};
pub use sleep::{SleepMeta, SleepTask};
pub use treatment::{TreatmentMeta, TreatmentTask};
pub use walk::WalkTask;

use crate::scheduling::{MetaTask, MetaTaskRegistry};

/// Every policy in the library, in registration order
pub fn standard_policies() -> Vec<MetaTask> {
    vec![
        MetaTask::factory(SleepMeta::new()),
        MetaTask::factory(EatMeta::new()),
        MetaTask::factory(ReadMeta::new()),
        MetaTask::factory(ResearchMeta::new()),
        MetaTask::factory(TreatmentMeta::new()),
        MetaTask::factory(ExploreMeta::new()),
        MetaTask::factory(ReturnInsideMeta::new()),
        MetaTask::settlement(MaintainVehicleMeta::new()),
        MetaTask::settlement(RepairMeta::new()),
    ]
}

/// Registry holding the whole library
pub fn standard_registry() -> MetaTaskRegistry {
    let mut registry = MetaTaskRegistry::new();
    for policy in standard_policies() {
        if let Err(e) = registry.register(policy) {
            tracing::error!(error = %e, "skipping task policy");
        }
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{DutyStatus, WorkerKind};

    #[test]
    fn test_standard_registry_complete() {
        let registry = standard_registry();
        assert_eq!(registry.len(), 9);
        for id in [
            "sleep",
            "eat",
            "read",
            "research",
            "treatment",
            "explore",
            "return_inside",
            "maintain_vehicle",
            "repair",
        ] {
            assert!(registry.get(id).is_some(), "missing policy {}", id);
        }
    }

    #[test]
    fn test_robots_get_a_reduced_library() {
        let registry = standard_registry();
        let ids: Vec<&str> = registry
            .for_worker(WorkerKind::Robot, DutyStatus::OnDuty)
            .map(|p| p.id())
            .collect();
        assert_eq!(ids, vec!["sleep", "return_inside", "maintain_vehicle", "repair"]);
    }
}
