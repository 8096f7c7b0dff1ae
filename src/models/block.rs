use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::interval::Interval;

/// Category label on a schedule block. Unknown labels from the assistant
/// are coerced to `Task` during normalization rather than rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Class,
    Task,
    Break,
    Lunch,
    Dinner,
    Commitment,
}

impl BlockType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "class" => Some(BlockType::Class),
            "task" => Some(BlockType::Task),
            "break" => Some(BlockType::Break),
            "lunch" => Some(BlockType::Lunch),
            "dinner" => Some(BlockType::Dinner),
            "commitment" => Some(BlockType::Commitment),
            _ => None,
        }
    }
}

/// A normalized schedule block, ready for the caller to persist. Invariant
/// `start < end` is guaranteed by the validator and fallback scheduler; a
/// `task` block's `task_id` either references a known task or is absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlockData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl ScheduleBlockData {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}
