use serde::{Deserialize, Serialize};

use crate::models::block::ScheduleBlockData;
use crate::models::commitment::ClassCommitment;
use crate::models::task::TaskContext;
use crate::services::wall_clock::CalendarDate;

fn default_day_start_hour() -> u32 {
    6
}

fn default_day_end_hour() -> u32 {
    22
}

/// Student preferences forwarded to the assistant and used to shape the
/// local day window. Hours are local wall-clock hours on the target date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingPreferences {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub notes: Option<String>,
}

impl Default for SchedulingPreferences {
    fn default() -> Self {
        Self {
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            notes: None,
        }
    }
}

/// Aggregate input for one engine invocation: everything is a caller-owned
/// snapshot, the engine never mutates it and performs no I/O of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingRequest {
    #[serde(default)]
    pub tasks: Vec<TaskContext>,
    #[serde(default)]
    pub commitments: Vec<ClassCommitment>,
    #[serde(default)]
    pub existing_blocks: Vec<ScheduleBlockData>,
    #[serde(default)]
    pub preferences: SchedulingPreferences,
    pub target_date: CalendarDate,
    pub timezone: String,
}

impl SchedulingRequest {
    pub fn task_by_id(&self, id: &str) -> Option<&TaskContext> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Output of schedule generation. `warnings` carries every degradation the
/// engine applied (dropped task links, fallback usage, DST adjustments) so
/// the caller can surface them instead of guessing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingResult {
    pub blocks: Vec<ScheduleBlockData>,
    pub reasoning: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}
