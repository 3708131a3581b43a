//! Activity history records.

use serde::{Deserialize, Serialize};

use crate::timestamp::SimTime;

/// One entry of a worker's activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub time: SimTime,
    pub task_name: String,
    pub phase: String,
    pub description: String,
    /// Mission the worker was assigned to when the entry was recorded
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mission: Option<String>,
}

impl ActivityRecord {
    pub fn new(
        time: SimTime,
        task_name: impl Into<String>,
        phase: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            time,
            task_name: task_name.into(),
            phase: phase.into(),
            description: description.into(),
            mission: None,
        }
    }

    pub fn with_mission(mut self, mission: impl Into<String>) -> Self {
        self.mission = Some(mission.into());
        self
    }

    /// Returns true if this entry describes the same activity state as `other`,
    /// ignoring when it was recorded.
    pub fn same_activity(&self, other: &ActivityRecord) -> bool {
        self.task_name == other.task_name
            && self.phase == other.phase
            && self.description == other.description
            && self.mission == other.mission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_activity_ignores_time() {
        let a = ActivityRecord::new(SimTime::new(1, 10.0), "Sleep", "Sleeping", "Sleeping");
        let b = ActivityRecord::new(SimTime::new(1, 90.0), "Sleep", "Sleeping", "Sleeping");
        assert!(a.same_activity(&b));

        let c = b.clone().with_mission("Trade run");
        assert!(!a.same_activity(&c));
    }

    #[test]
    fn test_mission_omitted_when_absent() {
        let record = ActivityRecord::new(SimTime::start(), "Eat", "Eating", "Eating a meal");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("mission"));
    }
}
