//! Task Jobs
//!
//! A scored, executable recipe produced by a policy during one scoring pass.

use task_events::JobRecord;

use crate::error::TaskError;

use super::env::WorkerEnv;
use super::meta::{MetaTask, Target};
use super::rating::RatingScore;
use super::task::Task;

/// One candidate in a task cache. Immutable once built.
#[derive(Debug, Clone)]
pub struct TaskJob {
    description: String,
    rating: RatingScore,
    score: f64,
    target: Option<Target>,
    policy: MetaTask,
}

impl TaskJob {
    pub fn new(
        policy: MetaTask,
        description: impl Into<String>,
        rating: RatingScore,
        target: Option<Target>,
    ) -> Self {
        let score = rating.value();
        Self {
            description: description.into(),
            rating,
            score,
            target,
            policy,
        }
    }

    /// A job with a constant score, described by the policy's name
    pub fn fixed(policy: MetaTask, score: f64) -> Self {
        let description = policy.spec().name().to_string();
        Self::new(policy, description, RatingScore::new("fixed", score), None)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn rating(&self) -> &RatingScore {
        &self.rating
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn policy(&self) -> &MetaTask {
        &self.policy
    }

    pub fn policy_id(&self) -> &str {
        self.policy.id()
    }

    pub fn is_effort_driven(&self) -> bool {
        self.policy.spec().is_effort_driven()
    }

    /// Builds the task this job describes, bound to the worker in `env`.
    pub fn create_task(&self, env: &WorkerEnv<'_>) -> Result<Box<dyn Task>, TaskError> {
        self.policy.instantiate(env, self.target.as_ref())
    }

    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            description: self.description.clone(),
            score: self.score,
            target: self.target.as_ref().map(|t| t.to_string()),
            breakdown: self.rating.breakdown(),
        }
    }
}
