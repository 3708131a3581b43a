//! Task Policies
//!
//! A task policy ("meta task") is registered once and asked, for a given
//! worker at a given instant, which concrete jobs it could offer and how
//! desirable each one is. Policies are stateless and shared.
//!
//! There are two kinds:
//! - [`FactoryMetaTask`] computes one score and offers at most one job.
//! - [`SettlementMetaTask`] enumerates targets at the worker's settlement
//!   (vehicles, buildings) and offers one job per target.

use std::fmt;
use std::sync::Arc;

use crate::components::{DutyStatus, FavoriteActivity, JobType, WorkerKind};
use crate::error::TaskError;

use super::env::WorkerEnv;
use super::job::TaskJob;
use super::rating::RatingScore;
use super::task::Task;

/// Which workers a policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerSupport {
    Person,
    Robot,
    Both,
}

impl WorkerSupport {
    pub fn supports(&self, kind: WorkerKind) -> bool {
        match self {
            WorkerSupport::Person => kind == WorkerKind::Person,
            WorkerSupport::Robot => kind == WorkerKind::Robot,
            WorkerSupport::Both => true,
        }
    }
}

/// Hours of the shift a policy is considered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyScope {
    AnyHour,
    WorkHour,
    NonWorkHour,
}

impl DutyScope {
    /// On duty: work-hour and any-hour policies. Off duty: non-work-hour and
    /// any-hour. On call: everything.
    pub fn matches(&self, duty: DutyStatus) -> bool {
        match (self, duty) {
            (DutyScope::AnyHour, _) | (_, DutyStatus::OnCall) => true,
            (DutyScope::WorkHour, DutyStatus::OnDuty) => true,
            (DutyScope::NonWorkHour, DutyStatus::OffDuty) => true,
            _ => false,
        }
    }
}

/// Characteristics of the activity a policy produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskTrait {
    Academic,
    Leadership,
    Medical,
    Passive,
    Relaxation,
    Strength,
    Technical,
}

impl TaskTrait {
    /// Traits whose activities cost no physical effort
    pub fn is_effortless(&self) -> bool {
        matches!(
            self,
            TaskTrait::Passive | TaskTrait::Relaxation | TaskTrait::Medical | TaskTrait::Leadership
        )
    }
}

/// Immutable descriptor of a task policy.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaTaskSpec {
    id: String,
    name: String,
    support: WorkerSupport,
    scope: DutyScope,
    favorites: Vec<FavoriteActivity>,
    traits: Vec<TaskTrait>,
    preferred_jobs: Vec<JobType>,
    effort_driven: bool,
}

impl MetaTaskSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            support: WorkerSupport::Both,
            scope: DutyScope::AnyHour,
            favorites: Vec::new(),
            traits: Vec::new(),
            preferred_jobs: Vec::new(),
            effort_driven: true,
        }
    }

    pub fn with_support(mut self, support: WorkerSupport) -> Self {
        self.support = support;
        self
    }

    pub fn with_scope(mut self, scope: DutyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_favorites(mut self, favorites: &[FavoriteActivity]) -> Self {
        self.favorites.extend_from_slice(favorites);
        self
    }

    /// Sets the task traits and derives whether the activity costs effort.
    pub fn with_traits(mut self, traits: &[TaskTrait]) -> Self {
        self.traits.extend_from_slice(traits);
        self.effort_driven = !self.traits.iter().any(TaskTrait::is_effortless);
        self
    }

    pub fn with_preferred_jobs(mut self, jobs: &[JobType]) -> Self {
        self.preferred_jobs.extend_from_slice(jobs);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn support(&self) -> WorkerSupport {
        self.support
    }

    pub fn scope(&self) -> DutyScope {
        self.scope
    }

    pub fn favorites(&self) -> &[FavoriteActivity] {
        &self.favorites
    }

    pub fn traits(&self) -> &[TaskTrait] {
        &self.traits
    }

    pub fn has_trait(&self, task_trait: TaskTrait) -> bool {
        self.traits.contains(&task_trait)
    }

    pub fn preferred_jobs(&self) -> &[JobType] {
        &self.preferred_jobs
    }

    pub fn is_effort_driven(&self) -> bool {
        self.effort_driven
    }

    /// True when a worker without a job, or with a listed job, is preferred.
    /// A policy with no preferred jobs prefers everyone.
    pub fn prefers_job(&self, job: Option<JobType>) -> bool {
        self.preferred_jobs.is_empty()
            || job.is_some_and(|job| self.preferred_jobs.contains(&job))
    }

    /// True if the policy should be scored for this kind of worker in this
    /// duty status
    pub fn applies_to(&self, kind: WorkerKind, duty: DutyStatus) -> bool {
        self.support.supports(kind) && self.scope.matches(duty)
    }
}

/// Something a settlement policy binds its task to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Vehicle(String),
    Building(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Vehicle(id) => write!(f, "vehicle:{}", id),
            Target::Building(id) => write!(f, "building:{}", id),
        }
    }
}

/// One scored target offered by a [`SettlementMetaTask`]
#[derive(Debug, Clone)]
pub struct TargetScore {
    pub target: Target,
    pub description: String,
    pub score: RatingScore,
}

impl TargetScore {
    pub fn new(target: Target, description: impl Into<String>, score: RatingScore) -> Self {
        Self {
            target,
            description: description.into(),
            score,
        }
    }
}

/// A policy that offers at most one job.
pub trait FactoryMetaTask: fmt::Debug + Send + Sync {
    fn spec(&self) -> &MetaTaskSpec;

    /// Desirability of the activity for this worker right now; zero or less
    /// means "not applicable".
    fn score(&self, env: &WorkerEnv<'_>) -> RatingScore;

    fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError>;
}

/// A policy that offers one job per target at the worker's settlement.
pub trait SettlementMetaTask: fmt::Debug + Send + Sync {
    fn spec(&self) -> &MetaTaskSpec;

    fn targets(&self, env: &WorkerEnv<'_>) -> Vec<TargetScore>;

    fn create_task(&self, env: &WorkerEnv<'_>, target: &Target)
        -> Result<Box<dyn Task>, TaskError>;
}

/// A registered policy of either kind.
#[derive(Debug, Clone)]
pub enum MetaTask {
    Factory(Arc<dyn FactoryMetaTask>),
    Settlement(Arc<dyn SettlementMetaTask>),
}

impl MetaTask {
    pub fn factory(policy: impl FactoryMetaTask + 'static) -> Self {
        MetaTask::Factory(Arc::new(policy))
    }

    pub fn settlement(policy: impl SettlementMetaTask + 'static) -> Self {
        MetaTask::Settlement(Arc::new(policy))
    }

    pub fn spec(&self) -> &MetaTaskSpec {
        match self {
            MetaTask::Factory(policy) => policy.spec(),
            MetaTask::Settlement(policy) => policy.spec(),
        }
    }

    pub fn id(&self) -> &str {
        self.spec().id()
    }

    /// Scores this policy for the worker. Never fails; returns no jobs when
    /// nothing applies.
    pub fn candidates(&self, env: &WorkerEnv<'_>) -> Vec<TaskJob> {
        match self {
            MetaTask::Factory(policy) => {
                let score = policy.score(env);
                if !score.is_positive() {
                    return Vec::new();
                }
                vec![TaskJob::new(
                    self.clone(),
                    policy.spec().name(),
                    score,
                    None,
                )]
            }
            MetaTask::Settlement(policy) => policy
                .targets(env)
                .into_iter()
                .filter(|candidate| candidate.score.is_positive())
                .map(|candidate| {
                    TaskJob::new(
                        self.clone(),
                        candidate.description,
                        candidate.score,
                        Some(candidate.target),
                    )
                })
                .collect(),
        }
    }

    /// Builds a task for the worker, bound to `target` for settlement
    /// policies.
    pub fn instantiate(
        &self,
        env: &WorkerEnv<'_>,
        target: Option<&Target>,
    ) -> Result<Box<dyn Task>, TaskError> {
        let spec = self.spec();
        if !spec.support().supports(env.worker.kind) {
            return Err(TaskError::UnsupportedWorker {
                policy: spec.id().to_string(),
                kind: env.worker.kind.to_string(),
            });
        }
        match (self, target) {
            (MetaTask::Factory(policy), _) => policy.create_task(env),
            (MetaTask::Settlement(policy), Some(target)) => policy.create_task(env, target),
            (MetaTask::Settlement(_), None) => Err(TaskError::Precondition {
                task: spec.name().to_string(),
                reason: "no target selected".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Settlement, Worker};
    use crate::config::SchedulerConfig;
    use crate::scheduling::task::{TaskCore, TaskPhase};
    use crate::scheduling::TaskContext;
    use task_events::SimTime;

    const IDLE: TaskPhase = TaskPhase::new("Idle");

    #[derive(Debug)]
    struct Idle {
        core: TaskCore,
    }

    impl Task for Idle {
        fn core(&self) -> &TaskCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut TaskCore {
            &mut self.core
        }

        fn perform_phase(
            &mut self,
            _phase: TaskPhase,
            _time: f64,
            _ctx: &mut TaskContext<'_>,
        ) -> Result<f64, TaskError> {
            Ok(0.0)
        }
    }

    #[derive(Debug)]
    struct Fixed {
        spec: MetaTaskSpec,
        score: f64,
    }

    impl FactoryMetaTask for Fixed {
        fn spec(&self) -> &MetaTaskSpec {
            &self.spec
        }

        fn score(&self, _env: &WorkerEnv<'_>) -> RatingScore {
            RatingScore::new("fixed", self.score)
        }

        fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
            Ok(Box::new(Idle {
                core: TaskCore::new(self.spec.name(), &env.worker.id, self.spec.name())
                    .with_phases(&[IDLE]),
            }))
        }
    }

    #[derive(Debug)]
    struct PerBuilding {
        spec: MetaTaskSpec,
    }

    impl SettlementMetaTask for PerBuilding {
        fn spec(&self) -> &MetaTaskSpec {
            &self.spec
        }

        fn targets(&self, env: &WorkerEnv<'_>) -> Vec<TargetScore> {
            env.settlement
                .map(|s| {
                    s.buildings
                        .iter()
                        .map(|b| {
                            TargetScore::new(
                                Target::Building(b.id.clone()),
                                format!("Clean {}", b.name),
                                RatingScore::new("occupants", b.occupants as f64),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        }

        fn create_task(
            &self,
            env: &WorkerEnv<'_>,
            target: &Target,
        ) -> Result<Box<dyn Task>, TaskError> {
            Ok(Box::new(Idle {
                core: TaskCore::new("Clean", &env.worker.id, target.to_string())
                    .with_phases(&[IDLE]),
            }))
        }
    }

    fn fixed(score: f64) -> MetaTask {
        MetaTask::factory(Fixed {
            spec: MetaTaskSpec::new("fixed", "Fixed").with_support(WorkerSupport::Person),
            score,
        })
    }

    #[test]
    fn test_duty_scope_matching() {
        assert!(DutyScope::WorkHour.matches(DutyStatus::OnDuty));
        assert!(!DutyScope::WorkHour.matches(DutyStatus::OffDuty));
        assert!(DutyScope::NonWorkHour.matches(DutyStatus::OffDuty));
        assert!(!DutyScope::NonWorkHour.matches(DutyStatus::OnDuty));
        assert!(DutyScope::AnyHour.matches(DutyStatus::OffDuty));
        assert!(DutyScope::WorkHour.matches(DutyStatus::OnCall));
        assert!(DutyScope::NonWorkHour.matches(DutyStatus::OnCall));
    }

    #[test]
    fn test_effort_driven_from_traits() {
        let spec = MetaTaskSpec::new("read", "Reading");
        assert!(spec.is_effort_driven());
        assert!(!spec
            .clone()
            .with_traits(&[TaskTrait::Relaxation])
            .is_effort_driven());
        assert!(MetaTaskSpec::new("dig", "Digging")
            .with_traits(&[TaskTrait::Strength])
            .is_effort_driven());
    }

    #[test]
    fn test_preferred_jobs() {
        let open = MetaTaskSpec::new("eat", "Eating");
        assert!(open.prefers_job(None));

        let research =
            MetaTaskSpec::new("research", "Research").with_preferred_jobs(&[JobType::Scientist]);
        assert!(research.prefers_job(Some(JobType::Scientist)));
        assert!(!research.prefers_job(Some(JobType::Pilot)));
        assert!(!research.prefers_job(None));
    }

    #[test]
    fn test_factory_candidates() {
        let worker = Worker::person("w1", "Ana");
        let config = SchedulerConfig::default();
        let env = WorkerEnv::new(&worker, None, SimTime::start(), &config);

        let jobs = fixed(30.0).candidates(&env);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].description(), "Fixed");
        assert_eq!(jobs[0].score(), 30.0);

        assert!(fixed(0.0).candidates(&env).is_empty());
    }

    #[test]
    fn test_settlement_candidates_skip_zero_targets() {
        use crate::components::Building;

        let settlement = Settlement::new("base", "Base")
            .with_building(Building::new("b1", "Hab", 6).with_occupants(3))
            .with_building(Building::new("b2", "Storage", 2));
        let worker = Worker::person("w1", "Ana");
        let config = SchedulerConfig::default();
        let env = WorkerEnv::new(&worker, Some(&settlement), SimTime::start(), &config);

        let policy = MetaTask::settlement(PerBuilding {
            spec: MetaTaskSpec::new("clean", "Cleaning"),
        });
        let jobs = policy.candidates(&env);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].target(), Some(&Target::Building("b1".into())));

        let task = jobs[0].create_task(&env).unwrap();
        assert_eq!(task.description(), "building:b1");
        assert!(policy.instantiate(&env, None).is_err());
    }

    #[test]
    fn test_unsupported_worker_rejected() {
        let robot = Worker::robot("r1", "Unit 7");
        let config = SchedulerConfig::default();
        let env = WorkerEnv::new(&robot, None, SimTime::start(), &config);

        let err = fixed(10.0).instantiate(&env, None).unwrap_err();
        assert!(matches!(err, TaskError::UnsupportedWorker { .. }));
    }
}
