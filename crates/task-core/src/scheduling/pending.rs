//! Pending task requests queued for a worker by other parts of the simulation.

use std::collections::VecDeque;

use task_events::SimTime;
use uuid::Uuid;

/// A request to run a specific policy's task when the worker is next idle
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub id: Uuid,
    pub policy_id: String,
    pub description: String,
    pub requested_at: SimTime,
}

impl PendingRequest {
    pub fn new(policy_id: impl Into<String>, description: impl Into<String>, at: SimTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            policy_id: policy_id.into(),
            description: description.into(),
            requested_at: at,
        }
    }
}

/// FIFO queue of pending requests
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    requests: VecDeque<PendingRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: PendingRequest) -> Uuid {
        let id = request.id;
        self.requests.push_back(request);
        id
    }

    pub fn pop(&mut self) -> Option<PendingRequest> {
        self.requests.pop_front()
    }

    /// Removes a request by id. Returns the removed request, if it was queued.
    pub fn remove(&mut self, id: Uuid) -> Option<PendingRequest> {
        let index = self.requests.iter().position(|r| r.id == id)?;
        self.requests.remove(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.iter()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
