use serde_json::{json, Value as JsonValue};

use crate::models::commitment::weekday_label;
use crate::models::interval::Interval;
use crate::models::request::SchedulingRequest;
use crate::services::wall_clock::{self};
use chrono_tz::Tz;

/// System prompt guiding the assistant when proposing a day schedule.
pub fn schedule_planning_system_prompt() -> &'static str {
    r#"You are StudyPlan's daily planning copilot. Given a student's tasks,
class commitments and preferences for one target date, produce a JSON object
strictly matching this schema. Always respond with valid UTF-8 JSON and do
not wrap the response in markdown code blocks. The schema is:
{
  "blocks": [{
     "title": string,
     "description": string|null,
     "startTime": string,
     "endTime": string,
     "type": "class"|"task"|"break"|"lunch"|"dinner"|"commitment",
     "reasoning": string|null,
     "taskId": string|null
  }],
  "reasoning": string,
  "warnings": string[]
}
Emit every timestamp as local time in the student's timezone, in the form
YYYY-MM-DDTHH:mm:ss with NO timezone suffix. Schedule only the target date,
never overlap a class commitment, and set taskId only to ids from the
supplied task list."#
}

/// System prompt for ranking reschedule candidates.
pub fn slot_ranking_system_prompt() -> &'static str {
    r#"You are StudyPlan's rescheduling advisor. You receive a displaced
schedule block and a fixed list of candidate start times. Rank the
candidates from best to worst for the student and respond with JSON:
{
  "rankedTimes": [{ "startTime": string, "reasoning": string|null }]
}
Each startTime MUST be copied verbatim from the candidates list; never
invent new times. Keep the list at most three entries."#
}

/// Build the user payload for a day-planning request.
pub fn build_planning_payload(req: &SchedulingRequest) -> JsonValue {
    let tasks: Vec<JsonValue> = req
        .tasks
        .iter()
        .map(|task| {
            json!({
                "id": task.id,
                "description": task.description,
                "complexity": task.complexity,
                "category": task.category,
                "dueDate": task.due_date,
            })
        })
        .collect();

    let commitments: Vec<JsonValue> = req
        .commitments
        .iter()
        .map(|commitment| {
            json!({
                "courseName": commitment.course_name,
                "meetingTimes": commitment
                    .meeting_times
                    .iter()
                    .map(|meeting| json!({
                        "weekday": weekday_label(meeting.weekday),
                        "start": meeting.start_wall,
                        "end": meeting.end_wall,
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "operation": "planDay",
        "targetDate": req.target_date.to_string(),
        "timezone": req.timezone,
        "tasks": tasks,
        "commitments": commitments,
        "preferences": {
            "dayStartHour": req.preferences.day_start_hour,
            "dayEndHour": req.preferences.day_end_hour,
            "notes": req.preferences.notes,
        },
        "expectations": {
            "localTimestamps": true,
            "timestampFormat": "YYYY-MM-DDTHH:mm:ss",
            "singleDate": true,
        }
    })
}

/// Build the user payload for a slot-ranking request. Candidate starts are
/// formatted as local wall times so the assistant reasons in the student's
/// clock, and the advisor matches its answer back against the same strings.
pub fn build_ranking_payload(
    block_title: &str,
    duration_minutes: i64,
    candidates: &[Interval],
    tz: Tz,
) -> JsonValue {
    let starts: Vec<String> = candidates
        .iter()
        .map(|slot| wall_clock::to_wall_clock(slot.start, tz).to_string())
        .collect();

    json!({
        "operation": "rankSlots",
        "block": { "title": block_title, "durationMinutes": duration_minutes },
        "candidates": starts,
        "expectations": { "maxRanked": 3, "verbatimCandidatesOnly": true }
    })
}
