use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc, Weekday};
use serde_json::{json, Value as JsonValue};

use studyplan_engine::error::{EngineError, EngineResult};
use studyplan_engine::models::block::BlockType;
use studyplan_engine::models::commitment::{ClassCommitment, MeetingTime};
use studyplan_engine::models::request::{SchedulingPreferences, SchedulingRequest};
use studyplan_engine::models::task::{TaskComplexity, TaskContext};
use studyplan_engine::services::planner::generate_schedule;
use studyplan_engine::services::wall_clock::CalendarDate;
use studyplan_engine::ScheduleAssistant;

struct ScriptedAssistant {
    plan: EngineResult<JsonValue>,
    calls: AtomicUsize,
}

impl ScriptedAssistant {
    fn returning(plan: JsonValue) -> Self {
        Self {
            plan: Ok(plan),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            plan: Err(EngineError::Assistant {
                message: "provider unavailable".to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScheduleAssistant for ScriptedAssistant {
    async fn propose_schedule(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.plan {
            Ok(value) => Ok(value.clone()),
            Err(_) => Err(EngineError::Assistant {
                message: "provider unavailable".to_string(),
            }),
        }
    }

    async fn rank_slots(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
        Err(EngineError::Assistant {
            message: "ranking not scripted".to_string(),
        })
    }
}

fn monday_request(tasks: Vec<TaskContext>) -> SchedulingRequest {
    // 2025-04-07 is a Monday; America/New_York is on EDT (UTC-4).
    SchedulingRequest {
        tasks,
        commitments: vec![ClassCommitment {
            course_name: "Linear Algebra".to_string(),
            meeting_times: vec![MeetingTime {
                weekday: Weekday::Mon,
                start_wall: "10:00".to_string(),
                end_wall: "11:00".to_string(),
            }],
        }],
        existing_blocks: Vec::new(),
        preferences: SchedulingPreferences::default(),
        target_date: CalendarDate::new(2025, 4, 7),
        timezone: "America/New_York".to_string(),
    }
}

fn study_tasks() -> Vec<TaskContext> {
    vec![
        TaskContext::new("t-essay", "Essay outline", TaskComplexity::Medium),
        TaskContext::new("t-quiz", "Quiz prep", TaskComplexity::Simple),
    ]
}

#[tokio::test]
async fn assistant_plan_flows_through_validation_to_utc_blocks() {
    let assistant = ScriptedAssistant::returning(json!({
        "blocks": [
            {
                "title": "Linear Algebra",
                "startTime": "2025-04-07T10:00:00",
                "endTime": "2025-04-07T11:00:00",
                "type": "class"
            },
            {
                "title": "Essay outline",
                "startTime": "2025-04-07T09:00:00",
                "endTime": "2025-04-07T10:00:00",
                "type": "task",
                "taskId": "t-essay",
                "reasoning": "Fresh focus before class"
            },
            {
                "title": "Quiz prep",
                "startTime": "2025-04-07T11:10:00",
                "endTime": "2025-04-07T11:40:00",
                "type": "task",
                "taskId": "t-quiz"
            }
        ],
        "reasoning": "Tasks slotted around the Monday lecture"
    }));

    let result = generate_schedule(&monday_request(study_tasks()), Some(&assistant))
        .await
        .expect("schedule");

    assert_eq!(result.blocks.len(), 3);
    assert!(result.warnings.is_empty());
    assert_eq!(result.reasoning, "Tasks slotted around the Monday lecture");
    assert_eq!(assistant.call_count(), 1);

    // Sorted by start, local wall times converted to UTC (EDT is UTC-4).
    assert_eq!(result.blocks[0].title, "Essay outline");
    assert_eq!(
        result.blocks[0].start,
        Utc.with_ymd_and_hms(2025, 4, 7, 13, 0, 0).unwrap()
    );
    assert_eq!(result.blocks[1].block_type, BlockType::Class);
    assert_eq!(
        result.blocks[1].start,
        Utc.with_ymd_and_hms(2025, 4, 7, 14, 0, 0).unwrap()
    );
    assert_eq!(result.blocks[2].task_id.as_deref(), Some("t-quiz"));

    // Every block carries a fresh id.
    assert!(result.blocks.iter().all(|block| !block.id.is_empty()));
}

#[tokio::test]
async fn partially_broken_plan_keeps_good_blocks_and_reports_the_rest() {
    let assistant = ScriptedAssistant::returning(json!({
        "blocks": [
            {
                "title": "Essay outline",
                "startTime": "2025-04-07T09:00:00",
                "endTime": "2025-04-07T10:00:00",
                "type": "task",
                "taskId": "t-essay"
            },
            {
                "title": "Backwards block",
                "startTime": "2025-04-07T15:00:00",
                "endTime": "2025-04-07T14:00:00",
                "type": "task"
            },
            {
                "title": "Ghost task",
                "startTime": "2025-04-07T16:00:00",
                "endTime": "2025-04-07T16:30:00",
                "type": "task",
                "taskId": "does-not-exist"
            }
        ]
    }));

    let result = generate_schedule(&monday_request(study_tasks()), Some(&assistant))
        .await
        .expect("schedule");

    // The inverted block is dropped; the dangling link is severed, not fatal.
    assert_eq!(result.blocks.len(), 2);
    assert!(result
        .blocks
        .iter()
        .all(|block| block.task_id.as_deref() != Some("does-not-exist")));
    assert!(result.warnings.iter().any(|w| w.contains("Backwards block")));
    assert!(result.warnings.iter().any(|w| w.contains("does-not-exist")));
}

#[tokio::test]
async fn assistant_outage_falls_back_to_sequential_schedule() {
    let assistant = ScriptedAssistant::failing();
    let tasks = vec![
        TaskContext::new("t1", "Read chapter 4", TaskComplexity::Simple),
        TaskContext::new("t2", "Essay outline", TaskComplexity::Medium),
        TaskContext::new("t3", "Project milestone", TaskComplexity::Complex),
    ];

    let result = generate_schedule(&monday_request(tasks), Some(&assistant))
        .await
        .expect("fallback schedule");

    assert_eq!(assistant.call_count(), 1);
    assert_eq!(result.blocks.len(), 3);

    // 09:00 local start, durations by complexity, ten-minute gaps.
    let expected = [
        (Utc.with_ymd_and_hms(2025, 4, 7, 13, 0, 0).unwrap(), 30),
        (Utc.with_ymd_and_hms(2025, 4, 7, 13, 40, 0).unwrap(), 60),
        (Utc.with_ymd_and_hms(2025, 4, 7, 14, 50, 0).unwrap(), 120),
    ];
    for (block, (start, minutes)) in result.blocks.iter().zip(expected) {
        assert_eq!(block.start, start);
        assert_eq!((block.end - block.start).num_minutes(), minutes);
        assert_eq!(block.block_type, BlockType::Task);
    }

    assert!(result.warnings[0].contains("assistant proposal unusable"));
    assert!(result
        .warnings
        .contains(&"fallback schedule ignores class times".to_string()));
}

#[tokio::test]
async fn empty_task_list_yields_empty_schedule_without_assistant_call() {
    let assistant = ScriptedAssistant::returning(json!({}));

    let result = generate_schedule(&monday_request(Vec::new()), Some(&assistant))
        .await
        .expect("empty schedule");

    assert!(result.blocks.is_empty());
    assert_eq!(result.warnings, vec!["No tasks found".to_string()]);
    assert_eq!(assistant.call_count(), 0);
}
