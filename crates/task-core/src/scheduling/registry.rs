//! Policy registry, keyed by policy id in registration order.

use crate::components::{DutyStatus, WorkerKind};
use crate::error::TaskError;

use super::meta::MetaTask;

#[derive(Debug, Clone, Default)]
pub struct MetaTaskRegistry {
    policies: Vec<MetaTask>,
}

impl MetaTaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a policy. Ids must be unique.
    pub fn register(&mut self, policy: MetaTask) -> Result<(), TaskError> {
        if self.get(policy.id()).is_some() {
            return Err(TaskError::DuplicatePolicy(policy.id().to_string()));
        }
        self.policies.push(policy);
        Ok(())
    }

    pub fn with(mut self, policy: MetaTask) -> Result<Self, TaskError> {
        self.register(policy)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&MetaTask> {
        self.policies.iter().find(|p| p.id() == id)
    }

    pub fn all(&self) -> &[MetaTask] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Policies to score for this kind of worker in this duty status
    pub fn for_worker(&self, kind: WorkerKind, duty: DutyStatus) -> impl Iterator<Item = &MetaTask> {
        self.policies
            .iter()
            .filter(move |p| p.spec().applies_to(kind, duty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::meta::{DutyScope, MetaTaskSpec, WorkerSupport};
    use crate::scheduling::testing::{fixed_policy, policy_from_spec};

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = MetaTaskRegistry::new();
        registry.register(fixed_policy("sleep", "Sleeping")).unwrap();
        let err = registry.register(fixed_policy("sleep", "Napping")).unwrap_err();
        assert_eq!(err, TaskError::DuplicatePolicy("sleep".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_filtering_by_worker() {
        let registry = MetaTaskRegistry::new()
            .with(policy_from_spec(
                MetaTaskSpec::new("work", "Working").with_scope(DutyScope::WorkHour),
                1.0,
            ))
            .and_then(|r| {
                r.with(policy_from_spec(
                    MetaTaskSpec::new("read", "Reading").with_scope(DutyScope::NonWorkHour),
                    1.0,
                ))
            })
            .and_then(|r| {
                r.with(policy_from_spec(
                    MetaTaskSpec::new("eat", "Eating").with_support(WorkerSupport::Person),
                    1.0,
                ))
            })
            .unwrap();

        let ids = |kind, duty| -> Vec<String> {
            registry
                .for_worker(kind, duty)
                .map(|p| p.id().to_string())
                .collect()
        };

        assert_eq!(ids(WorkerKind::Person, DutyStatus::OnDuty), vec!["work", "eat"]);
        assert_eq!(ids(WorkerKind::Person, DutyStatus::OffDuty), vec!["read", "eat"]);
        assert_eq!(
            ids(WorkerKind::Person, DutyStatus::OnCall),
            vec!["work", "read", "eat"]
        );
        assert_eq!(ids(WorkerKind::Robot, DutyStatus::OnDuty), vec!["work"]);
    }
}
