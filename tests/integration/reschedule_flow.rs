use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc, Weekday};
use serde_json::{json, Value as JsonValue};

use studyplan_engine::error::{EngineError, EngineResult};
use studyplan_engine::models::block::{BlockType, ScheduleBlockData};
use studyplan_engine::models::commitment::{ClassCommitment, MeetingTime};
use studyplan_engine::models::request::{SchedulingPreferences, SchedulingRequest};
use studyplan_engine::services::reschedule::suggest_reschedule;
use studyplan_engine::services::wall_clock::CalendarDate;
use studyplan_engine::ScheduleAssistant;

struct RankingAssistant(JsonValue);

#[async_trait]
impl ScheduleAssistant for RankingAssistant {
    async fn propose_schedule(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
        Err(EngineError::Assistant {
            message: "planning not scripted".to_string(),
        })
    }

    async fn rank_slots(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
        Ok(self.0.clone())
    }
}

// 2025-04-07 is a Monday; America/New_York is on EDT (UTC-4).
fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 7, hour, minute, 0).unwrap()
}

fn block(id: &str, title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleBlockData {
    ScheduleBlockData {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        start,
        end,
        block_type: BlockType::Task,
        completed: false,
        task_id: None,
        reasoning: None,
    }
}

fn monday_request(existing_blocks: Vec<ScheduleBlockData>) -> SchedulingRequest {
    SchedulingRequest {
        tasks: Vec::new(),
        commitments: vec![ClassCommitment {
            course_name: "Linear Algebra".to_string(),
            meeting_times: vec![MeetingTime {
                weekday: Weekday::Mon,
                start_wall: "10:00".to_string(),
                end_wall: "11:00".to_string(),
            }],
        }],
        existing_blocks,
        preferences: SchedulingPreferences::default(),
        target_date: CalendarDate::new(2025, 4, 7),
        timezone: "America/New_York".to_string(),
    }
}

// The displaced essay block occupies 09:00-10:00 local (13:00Z-14:00Z).
fn displaced() -> ScheduleBlockData {
    block("b-essay", "Essay outline", at(13, 0), at(14, 0))
}

#[tokio::test]
async fn chronological_suggestions_avoid_class_and_existing_blocks() {
    // Afternoon study session 14:00-16:00 local sits alongside the class.
    let req = monday_request(vec![
        displaced(),
        block("b-study", "Group study", at(18, 0), at(20, 0)),
    ]);

    let suggestions = suggest_reschedule(&displaced(), &req, None)
        .await
        .expect("suggestions");

    // Gaps inside the 06:00-22:00 local window: before the class, between
    // class and study session, after the study session. The displaced
    // block's own slot does not count as occupied.
    assert_eq!(suggestions.len(), 3);
    let starts: Vec<DateTime<Utc>> = suggestions.iter().map(|s| s.slot.start).collect();
    assert_eq!(starts, vec![at(10, 0), at(15, 0), at(20, 0)]);
    for suggestion in &suggestions {
        assert_eq!(suggestion.slot.duration().num_minutes(), 60);
        assert_eq!(suggestion.reasoning, "Available time slot");
    }
}

#[tokio::test]
async fn assistant_ranking_reorders_but_cannot_invent_times() {
    let req = monday_request(vec![
        displaced(),
        block("b-study", "Group study", at(18, 0), at(20, 0)),
    ]);
    // 15:00Z is 11:00 local; 23:59 local was never offered.
    let assistant = RankingAssistant(json!({
        "rankedTimes": [
            { "startTime": "2025-04-07T11:00:00", "reasoning": "Right after class" },
            { "startTime": "2025-04-07T23:59:00", "reasoning": "invented" }
        ]
    }));

    let suggestions = suggest_reschedule(&displaced(), &req, Some(&assistant))
        .await
        .expect("suggestions");

    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].slot.start, at(15, 0));
    assert_eq!(suggestions[0].reasoning, "Right after class");
    // The invented time is discarded; the rest backfill chronologically.
    assert_eq!(suggestions[1].slot.start, at(10, 0));
    assert_eq!(suggestions[1].reasoning, "Available time slot");
    assert_eq!(suggestions[2].slot.start, at(20, 0));
}

#[tokio::test]
async fn fully_packed_day_returns_no_suggestions() {
    // One block spans the whole 06:00-22:00 local window.
    let blocker = block(
        "b-wall",
        "All-day workshop",
        at(10, 0),
        Utc.with_ymd_and_hms(2025, 4, 8, 2, 0, 0).unwrap(),
    );
    let req = monday_request(vec![displaced(), blocker]);

    let suggestions = suggest_reschedule(&displaced(), &req, None)
        .await
        .expect("suggestions");
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn ranking_failure_falls_back_to_chronological_order() {
    struct BrokenAssistant;

    #[async_trait]
    impl ScheduleAssistant for BrokenAssistant {
        async fn propose_schedule(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
            Err(EngineError::Assistant {
                message: "planning not scripted".to_string(),
            })
        }

        async fn rank_slots(&self, _payload: &JsonValue) -> EngineResult<JsonValue> {
            Err(EngineError::Assistant {
                message: "timeout".to_string(),
            })
        }
    }

    let req = monday_request(vec![displaced()]);
    let suggestions = suggest_reschedule(&displaced(), &req, Some(&BrokenAssistant))
        .await
        .expect("suggestions");

    // Sole occupied interval is the projected class, so two gaps remain.
    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].slot.start, at(10, 0));
    assert_eq!(suggestions[1].slot.start, at(15, 0));
    assert!(suggestions.iter().all(|s| s.reasoning == "Available time slot"));
}
