//! Task Manager
//!
//! One per worker. Owns the current and previous task, the cached candidate
//! list, queued pending requests and the activity history, and decides when a
//! new task is picked and whether the running one may be replaced.

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use rand::Rng;
use task_events::{ActivityRecord, EndReason, SimTime, TaskEvent, TaskEventKind, WorkerId};
use uuid::Uuid;

use crate::components::{Settlement, Worker};
use crate::error::TaskError;
use crate::events::TaskListener;

use super::cache::TaskCache;
use super::context::SchedulerContext;
use super::env::{TaskContext, WorkerEnv};
use super::history::ActivityLog;
use super::meta::MetaTask;
use super::pending::{PendingQueue, PendingRequest};
use super::task::{Task, TaskPhase};

const TIME_EPSILON: f64 = 1e-9;

/// A task installed on a manager, with the job data it keeps needing
#[derive(Debug)]
pub struct ActiveTask {
    task: Box<dyn Task>,
    policy_id: String,
    effort_driven: bool,
}

impl ActiveTask {
    pub fn new(task: Box<dyn Task>, policy_id: impl Into<String>, effort_driven: bool) -> Self {
        Self {
            task,
            policy_id: policy_id.into(),
            effort_driven,
        }
    }

    pub fn task(&self) -> &dyn Task {
        self.task.as_ref()
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    pub fn is_effort_driven(&self) -> bool {
        self.effort_driven
    }
}

/// Result of one selection attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// A new task was installed
    Started { description: String },
    /// The running task may not be interrupted and was kept
    Retained,
    /// The selected job could not build its task; the worker stays idle
    FactoryFailed(TaskError),
    /// Nothing to select from
    NoCandidate,
}

impl SelectionOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, SelectionOutcome::Started { .. })
    }
}

/// Per-worker task controller
#[derive(Component)]
pub struct TaskManager {
    worker_id: WorkerId,
    context: Arc<SchedulerContext>,
    current: Option<ActiveTask>,
    last: Option<ActiveTask>,
    cache: Option<Arc<TaskCache>>,
    pending: PendingQueue,
    history: ActivityLog,
    listeners: Vec<Arc<dyn TaskListener>>,
}

impl TaskManager {
    pub fn new(worker_id: WorkerId, context: Arc<SchedulerContext>) -> Self {
        let capacity = context.config().history.capacity;
        Self {
            worker_id,
            context,
            current: None,
            last: None,
            cache: None,
            pending: PendingQueue::new(),
            history: ActivityLog::new(capacity),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn TaskListener>) {
        self.listeners.push(listener);
    }

    pub fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }

    pub fn context(&self) -> &Arc<SchedulerContext> {
        &self.context
    }

    pub fn current(&self) -> Option<&ActiveTask> {
        self.current.as_ref()
    }

    pub fn current_task(&self) -> Option<&dyn Task> {
        self.current.as_ref().map(ActiveTask::task)
    }

    pub fn last_task(&self) -> Option<&dyn Task> {
        self.last.as_ref().map(ActiveTask::task)
    }

    pub fn has_active_task(&self) -> bool {
        self.current.as_ref().is_some_and(|a| !a.task.is_done())
    }

    /// Description of the innermost running task
    pub fn task_description(&self) -> Option<&str> {
        self.current_task().map(|t| t.active_description())
    }

    pub fn cache(&self) -> Option<&Arc<TaskCache>> {
        self.cache.as_ref()
    }

    pub fn history(&self) -> &ActivityLog {
        &self.history
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &PendingRequest> {
        self.pending.iter()
    }

    /// Queues a request for a registered policy. It is started the next time
    /// the worker is idle.
    pub fn add_pending_task(
        &mut self,
        policy_id: &str,
        description: impl Into<String>,
        at: SimTime,
    ) -> Result<Uuid, TaskError> {
        if self.context.registry().get(policy_id).is_none() {
            return Err(TaskError::UnknownPolicy(policy_id.to_string()));
        }
        Ok(self.pending.push(PendingRequest::new(policy_id, description, at)))
    }

    pub fn remove_pending_task(&mut self, id: Uuid) -> bool {
        self.pending.remove(id).is_some()
    }

    /// Forces the next selection to rescore.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    /// Returns the cached candidates if they were computed for this minute
    /// tick and situation, rebuilding them otherwise.
    pub fn obtain_cache(&mut self, env: &WorkerEnv<'_>) -> Arc<TaskCache> {
        let tick = env.time.minute_tick();
        if let Some(cache) = &self.cache {
            if cache.is_current(tick, &env.context_label()) {
                tracing::debug!(worker = %self.worker_id, tick, "reusing task cache");
                return Arc::clone(cache);
            }
        }
        let cache = self.context.build_cache(env);
        self.cache = Some(Arc::clone(&cache));
        cache
    }

    /// Picks a job from the cache and installs its task, unless the running
    /// task is uninterruptible.
    pub fn start_new_task<R: Rng + ?Sized>(
        &mut self,
        worker: &Worker,
        settlement: Option<&Settlement>,
        now: SimTime,
        rng: &mut R,
    ) -> SelectionOutcome {
        let context = Arc::clone(&self.context);
        let env = WorkerEnv::new(worker, settlement, now, context.config());
        let cache = self.obtain_cache(&env);
        let Some(job) = cache.select(rng) else {
            return SelectionOutcome::NoCandidate;
        };

        if self.is_uninterruptible() {
            tracing::debug!(
                worker = %self.worker_id,
                kept = self.task_description().unwrap_or_default(),
                offered = job.description(),
                "running task cannot be interrupted"
            );
            return SelectionOutcome::Retained;
        }

        match job.create_task(&env) {
            Ok(task) => {
                let description = task.description().to_string();
                let active = ActiveTask::new(task, job.policy_id(), job.is_effort_driven());
                self.install(active, worker.mission.as_deref(), now);
                SelectionOutcome::Started { description }
            }
            Err(err) => {
                tracing::warn!(
                    worker = %self.worker_id,
                    job = job.description(),
                    "could not create task: {}",
                    err
                );
                SelectionOutcome::FactoryFailed(err)
            }
        }
    }

    /// Installs a task directly, ending whatever was running.
    pub fn replace_task(&mut self, active: ActiveTask, worker: &Worker, now: SimTime) {
        self.install(active, worker.mission.as_deref(), now);
    }

    /// Gives the current task up to `time` millisols and returns the time it
    /// left unused. Effort-driven tasks charge the worker for the time used.
    pub fn execute_task(&mut self, time: f64, efficiency: f64, ctx: &mut TaskContext<'_>) -> f64 {
        let context = Arc::clone(&self.context);
        let Some(active) = self.current.as_mut() else {
            return time;
        };

        let before = phase_key(active.task.as_ref());
        // Exposure is judged where the pulse started, not where it ended
        let unsheltered = ctx.worker.location.is_unsheltered();
        let leftover = match active.task.perform(time, ctx) {
            Ok(left) => left.clamp(0.0, time),
            Err(err) => {
                tracing::error!(
                    worker = %self.worker_id,
                    task = active.task.name(),
                    "task broke its phase contract: {}",
                    err
                );
                active.task.end_task(EndReason::Failed(err.to_string()));
                0.0
            }
        };

        let used = time - leftover;
        if active.effort_driven && used > 0.0 {
            let effort = &context.config().effort;
            let exposure = if unsheltered {
                effort.unsheltered_multiplier
            } else {
                1.0
            };
            ctx.worker
                .condition
                .apply_effort(used * efficiency.max(0.0) * exposure, effort);
        }

        let done = active.task.is_done();
        let changed = phase_key(active.task.as_ref()) != before;
        if done {
            self.retire_current(EndReason::Completed, ctx.time);
        } else if changed {
            self.notify(TaskEventKind::PhaseChanged, ctx.time);
            self.record_activity(ctx.worker.mission.as_deref(), ctx.time);
        }
        leftover
    }

    /// Runs one pulse for the worker: selects a task when idle and executes
    /// it. A task that finishes early hands its leftover time to the next
    /// selection, up to `selection.max_selections_per_tick` selections.
    /// Returns the unused time.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        worker: &mut Worker,
        settlement: Option<&Settlement>,
        now: SimTime,
        pulse: f64,
        rng: &mut R,
    ) -> f64 {
        if !worker.is_alive() {
            if self.has_active_task() {
                self.retire_current(EndReason::WorkerDied, now);
            }
            return pulse;
        }

        let max_selections = self.context.config().selection.max_selections_per_tick;
        let mut remaining = pulse.max(0.0);
        let mut selections = 0;
        while remaining > TIME_EPSILON {
            if !self.has_active_task() {
                if selections >= max_selections {
                    break;
                }
                selections += 1;
                let outcome = match self.start_pending(worker, settlement, now) {
                    Some(outcome @ SelectionOutcome::Started { .. }) => outcome,
                    _ => self.start_new_task(worker, settlement, now, rng),
                };
                if !outcome.is_started() {
                    break;
                }
            }

            let efficiency = worker.condition.performance;
            let mut ctx = TaskContext::new(worker, settlement, now);
            remaining = self.execute_task(remaining, efficiency, &mut ctx);
            if self.has_active_task() {
                break;
            }
        }
        remaining
    }

    /// Ends the current task and drops all pending requests.
    pub fn clear_all_tasks(&mut self, reason: &str, now: SimTime) {
        self.retire_current(EndReason::Cleared(reason.to_string()), now);
        self.pending.clear();
        self.cache = None;
    }

    fn is_uninterruptible(&self) -> bool {
        let preemption = &self.context.config().preemption;
        self.current
            .as_ref()
            .filter(|a| !a.task.is_done())
            .is_some_and(|a| {
                a.task
                    .activity_labels()
                    .iter()
                    .any(|label| preemption.is_uninterruptible(label))
            })
    }

    fn start_pending(
        &mut self,
        worker: &Worker,
        settlement: Option<&Settlement>,
        now: SimTime,
    ) -> Option<SelectionOutcome> {
        if !self.context.config().selection.consume_pending_when_idle || self.has_active_task() {
            return None;
        }
        let request = self.pending.pop()?;

        let context = Arc::clone(&self.context);
        let env = WorkerEnv::new(worker, settlement, now, context.config());
        let result = match context.registry().get(&request.policy_id) {
            Some(policy) => instantiate_requested(policy, &env)
                .map(|task| ActiveTask::new(task, policy.id(), policy.spec().is_effort_driven())),
            None => Err(TaskError::UnknownPolicy(request.policy_id.clone())),
        };

        match result {
            Ok(active) => {
                tracing::debug!(
                    worker = %self.worker_id,
                    request = %request.id,
                    "starting pending request: {}",
                    request.description
                );
                let description = active.task.description().to_string();
                self.install(active, worker.mission.as_deref(), now);
                Some(SelectionOutcome::Started { description })
            }
            Err(err) => {
                tracing::warn!(
                    worker = %self.worker_id,
                    request = %request.id,
                    "dropping pending request: {}",
                    err
                );
                Some(SelectionOutcome::FactoryFailed(err))
            }
        }
    }

    fn install(&mut self, active: ActiveTask, mission: Option<&str>, now: SimTime) {
        self.retire_current(EndReason::Preempted, now);
        self.current = Some(active);
        self.notify(TaskEventKind::Started, now);
        self.record_activity(mission, now);
    }

    /// Ends the current task if it is still running, reports the end and
    /// keeps it as the last task.
    fn retire_current(&mut self, reason: EndReason, now: SimTime) {
        let Some(mut old) = self.current.take() else {
            return;
        };
        old.task.end_task(reason);
        let reason = old
            .task
            .end_reason()
            .cloned()
            .unwrap_or(EndReason::Completed);
        let event = self.event_for(&old, TaskEventKind::Ended { reason }, now);
        self.emit(&event);
        self.last = Some(old);
    }

    fn notify(&self, kind: TaskEventKind, now: SimTime) {
        if let Some(active) = &self.current {
            let event = self.event_for(active, kind, now);
            self.emit(&event);
        }
    }

    fn event_for(&self, active: &ActiveTask, kind: TaskEventKind, now: SimTime) -> TaskEvent {
        let task = active.task.as_ref();
        let (_, phase) = task.active_phase();
        TaskEvent::new(
            self.worker_id.clone(),
            kind,
            task.name(),
            phase.map(|p| p.name().to_string()),
            task.active_description(),
            now,
        )
    }

    fn emit(&self, event: &TaskEvent) {
        for listener in &self.listeners {
            listener.on_task_event(event);
        }
    }

    fn record_activity(&mut self, mission: Option<&str>, now: SimTime) {
        let Some(active) = &self.current else {
            return;
        };
        let task = active.task.as_ref();
        let (name, phase) = task.active_phase();
        let mut record = ActivityRecord::new(
            now,
            name,
            phase.map_or("", |p| p.name()),
            task.active_description(),
        );
        if let Some(mission) = mission {
            record = record.with_mission(mission);
        }
        self.history.record(record);
    }
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("worker_id", &self.worker_id)
            .field("current", &self.current_task().map(|t| t.description()))
            .field("last", &self.last_task().map(|t| t.description()))
            .field("pending", &self.pending.len())
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn phase_key(task: &dyn Task) -> (String, Option<TaskPhase>) {
    let (name, phase) = task.active_phase();
    (name.to_string(), phase)
}

/// Builds the task for a pending request. Settlement policies use their best
/// scoring target.
fn instantiate_requested(
    policy: &MetaTask,
    env: &WorkerEnv<'_>,
) -> Result<Box<dyn Task>, TaskError> {
    match policy {
        MetaTask::Factory(_) => policy.instantiate(env, None),
        MetaTask::Settlement(_) => policy
            .candidates(env)
            .into_iter()
            .max_by(|a, b| a.score().total_cmp(&b.score()))
            .ok_or_else(|| TaskError::Precondition {
                task: policy.spec().name().to_string(),
                reason: "no target available".to_string(),
            })
            .and_then(|job| job.create_task(env)),
    }
}
