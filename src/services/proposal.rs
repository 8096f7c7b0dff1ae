use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::block::{BlockType, ScheduleBlockData};
use crate::models::request::SchedulingRequest;
use crate::services::wall_clock::{self, WallClockTime};

/// Endpoint sanity window: anything outside these years is assistant noise,
/// not a schedule.
const MIN_SANE_YEAR: i32 = 1970;
const MAX_SANE_YEAR: i32 = 2100;

/// One block as proposed by the planning assistant. Every field is
/// untrusted: time strings are free-form local timestamps, `task_id` may
/// reference nothing, `type` may be an arbitrary label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Top-level assistant response for a day plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantPlan {
    pub blocks: Vec<RawBlock>,
    pub reasoning: Option<String>,
    pub warnings: Vec<String>,
}

static PLAN_SCHEMA_VALUE: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "type": "object",
        "required": ["blocks"],
        "properties": {
            "blocks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title", "startTime", "endTime"],
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": ["string", "null"] },
                        "startTime": { "type": "string" },
                        "endTime": { "type": "string" },
                        "type": { "type": ["string", "null"] },
                        "reasoning": { "type": ["string", "null"] },
                        "taskId": { "type": ["string", "null"] }
                    }
                }
            },
            "reasoning": { "type": ["string", "null"] },
            "warnings": { "type": "array", "items": { "type": "string" } }
        }
    })
});

/// Check the raw assistant response against the plan schema and deserialize
/// it. Shape violations are reported with their instance paths so the
/// caller's logs show exactly what the model got wrong.
pub fn parse_plan(raw: &JsonValue) -> EngineResult<AssistantPlan> {
    let schema = jsonschema::JSONSchema::compile(&PLAN_SCHEMA_VALUE)
        .map_err(|err| EngineError::validation(format!("plan schema failed to compile: {err}")))?;

    if let Err(errors) = schema.validate(raw) {
        let messages: Vec<String> = errors
            .map(|error| {
                let path = error.instance_path.to_string();
                let path = if path.is_empty() { "root".to_string() } else { path };
                format!("{path}: {error}")
            })
            .collect();

        return Err(EngineError::validation_with_details(
            "assistant plan does not match the expected shape",
            json!({ "errors": messages }),
        ));
    }

    Ok(serde_json::from_value(raw.clone())?)
}

/// A proposal that survived validation: normalized blocks plus every
/// degradation warning accumulated along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProposal {
    pub blocks: Vec<ScheduleBlockData>,
    pub warnings: Vec<String>,
}

/// Run the validation pipeline over an assistant proposal.
///
/// Individual bad blocks are dropped with a warning naming the block index
/// and reason; the whole call fails only when the list is empty or every
/// block was rejected, which tells the planner to switch to the fallback
/// scheduler instead of retrying the assistant.
pub fn normalize(
    raw_blocks: &[RawBlock],
    req: &SchedulingRequest,
) -> EngineResult<NormalizedProposal> {
    let tz = wall_clock::lookup_timezone(&req.timezone)?;

    if raw_blocks.is_empty() {
        return Err(EngineError::validation("assistant proposal contains no blocks"));
    }

    let mut blocks = Vec::with_capacity(raw_blocks.len());
    let mut warnings = Vec::new();

    for (index, raw) in raw_blocks.iter().enumerate() {
        match normalize_block(index, raw, req, tz, &mut warnings) {
            Ok(block) => blocks.push(block),
            Err(reason) => {
                warn!(
                    target: "engine::proposal",
                    block = index,
                    title = %raw.title,
                    %reason,
                    "dropping proposed block"
                );
                warnings.push(format!("block {index} ({:?}) dropped: {reason}", raw.title));
            }
        }
    }

    if blocks.is_empty() {
        // Every block was rejected, so block 0 is the first offense.
        return Err(EngineError::validation_at(
            0,
            "every proposed block failed validation",
        )
        .with_details(json!({ "rejected": raw_blocks.len(), "warnings": warnings })));
    }

    debug!(
        target: "engine::proposal",
        accepted = blocks.len(),
        rejected = raw_blocks.len() - blocks.len(),
        "proposal normalized"
    );

    Ok(NormalizedProposal { blocks, warnings })
}

/// Validate one raw block. `Err` carries the human-readable rejection
/// reason; recoverable issues (gap-adjusted times, date drift, dangling
/// task links, unknown type labels) go to `warnings` instead.
fn normalize_block(
    index: usize,
    raw: &RawBlock,
    req: &SchedulingRequest,
    tz: Tz,
    warnings: &mut Vec<String>,
) -> Result<ScheduleBlockData, String> {
    let start = resolve_endpoint(index, "start", &raw.start_time, tz, warnings)?;
    let end = resolve_endpoint(index, "end", &raw.end_time, tz, warnings)?;

    if end.instant <= start.instant {
        return Err(format!(
            "end {} is not after start {}",
            raw.end_time.trim(),
            raw.start_time.trim()
        ));
    }

    for (label, wall) in [("start", &start.wall), ("end", &end.wall)] {
        if wall.year < MIN_SANE_YEAR || wall.year > MAX_SANE_YEAR {
            return Err(format!("{label} year {} is outside {MIN_SANE_YEAR}-{MAX_SANE_YEAR}", wall.year));
        }
    }

    if start.wall.date() != req.target_date {
        warnings.push(format!(
            "block {index}: starts on {} instead of the target date {}",
            start.wall.date(),
            req.target_date
        ));
    }

    let task_id = match raw.task_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            if req.task_by_id(id).is_some() {
                Some(id.to_string())
            } else {
                // A dangling reference never sinks the block; a partial
                // schedule beats none.
                warnings.push(format!(
                    "block {index}: references unknown task {id:?}; link dropped"
                ));
                None
            }
        }
        _ => None,
    };

    let block_type = match raw.block_type.as_deref().map(str::trim) {
        None | Some("") => BlockType::Task,
        Some(label) => BlockType::from_label(label).unwrap_or_else(|| {
            warnings.push(format!(
                "block {index}: unknown type {label:?}, treating as task"
            ));
            BlockType::Task
        }),
    };

    Ok(ScheduleBlockData {
        id: Uuid::new_v4().to_string(),
        title: raw.title.clone(),
        description: raw.description.clone(),
        start: start.instant,
        end: end.instant,
        block_type,
        completed: false,
        task_id,
        reasoning: raw.reasoning.clone(),
    })
}

struct ResolvedEndpoint {
    instant: DateTime<Utc>,
    wall: WallClockTime,
}

fn resolve_endpoint(
    index: usize,
    label: &str,
    raw: &str,
    tz: Tz,
    warnings: &mut Vec<String>,
) -> Result<ResolvedEndpoint, String> {
    let wall = wall_clock::parse_wall(raw)
        .map_err(|_| format!("unparseable {label} time {raw:?}"))?;

    let resolution = wall_clock::resolve_local(&wall, tz)
        .map_err(|err| format!("unresolvable {label} time {raw:?}: {err}"))?;

    if !resolution.exact {
        let adjusted = wall_clock::to_wall_clock(resolution.instant, tz);
        warnings.push(format!(
            "block {index}: {label} time {wall} falls in a DST gap; moved to {adjusted}"
        ));
    }

    // Keep the wall reading the assistant asked for, not the adjusted one:
    // the sanity and target-date checks judge the request itself.
    Ok(ResolvedEndpoint {
        instant: resolution.instant,
        wall,
    })
}
