use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rough effort classification driving fallback block durations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Simple,
    Medium,
    Complex,
}

impl TaskComplexity {
    /// Minutes the fallback scheduler reserves for a task of this size.
    pub fn default_minutes(self) -> i64 {
        match self {
            TaskComplexity::Simple => 30,
            TaskComplexity::Medium => 60,
            TaskComplexity::Complex => 120,
        }
    }
}

/// Immutable snapshot of one task handed to the engine by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    pub id: String,
    pub description: String,
    pub complexity: TaskComplexity,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskContext {
    pub fn new(id: impl Into<String>, description: impl Into<String>, complexity: TaskComplexity) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            complexity,
            category: None,
            due_date: None,
        }
    }
}
