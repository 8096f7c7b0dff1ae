use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::block::ScheduleBlockData;
use crate::models::interval::Interval;
use crate::models::request::SchedulingRequest;
use crate::services::assistant::ScheduleAssistant;
use crate::services::free_slots;
use crate::services::prompt_templates;
use crate::services::wall_clock;

pub const MAX_SUGGESTIONS: usize = 3;

const DEFAULT_REASONING: &str = "Available time slot";

/// One candidate window for a displaced block, with the reasoning shown to
/// the student.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleSuggestion {
    pub slot: Interval,
    pub reasoning: String,
}

/// Suggest up to three legal windows for one displaced block.
///
/// The occupied set is every other existing block plus the class
/// commitments projected onto the block's own calendar date; candidates
/// come from the free-slot finder with the block's exact duration. An
/// injected assistant may rank the candidates but can only choose among
/// them; times it invents are discarded, and any ranking failure falls
/// back to chronological order. A fully packed day yields an empty list,
/// which the caller renders as "no alternative times available", not an
/// error.
pub async fn suggest_reschedule(
    block: &ScheduleBlockData,
    req: &SchedulingRequest,
    assistant: Option<&dyn ScheduleAssistant>,
) -> EngineResult<Vec<RescheduleSuggestion>> {
    let tz = wall_clock::lookup_timezone(&req.timezone)?;

    let duration = block.end - block.start;
    if duration <= chrono::Duration::zero() {
        return Err(EngineError::validation(format!(
            "displaced block {:?} has a non-positive duration",
            block.title
        )));
    }

    let date = wall_clock::to_wall_clock(block.start, tz).date();
    let (window_start, window_end) = wall_clock::day_bounds(
        date,
        tz,
        req.preferences.day_start_hour,
        req.preferences.day_end_hour,
    )?;

    let mut occupied: Vec<Interval> = req
        .existing_blocks
        .iter()
        .filter(|existing| existing.id != block.id)
        .map(ScheduleBlockData::interval)
        .collect();
    occupied.extend(free_slots::project_commitments(&req.commitments, date, tz)?);

    let candidates = free_slots::find_free_slots(&occupied, window_start, window_end, duration);
    if candidates.is_empty() {
        debug!(
            target: "engine::reschedule",
            block = %block.id,
            "no free windows on the block's date"
        );
        return Ok(Vec::new());
    }

    if let Some(assistant) = assistant {
        let payload = prompt_templates::build_ranking_payload(
            &block.title,
            duration.num_minutes(),
            &candidates,
            tz,
        );
        match assistant.rank_slots(&payload).await {
            Ok(response) => return Ok(apply_ranking(&response, &candidates, tz)),
            Err(error) => {
                warn!(
                    target: "engine::reschedule",
                    block = %block.id,
                    %error,
                    "slot ranking failed, using chronological order"
                );
            }
        }
    }

    Ok(chronological(&candidates))
}

fn chronological(candidates: &[Interval]) -> Vec<RescheduleSuggestion> {
    candidates
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|slot| RescheduleSuggestion {
            slot: *slot,
            reasoning: DEFAULT_REASONING.to_string(),
        })
        .collect()
}

/// Map the assistant's ranking back onto the candidate set. Entries must
/// quote a candidate's local start time verbatim; anything else is
/// discarded. Remaining candidates backfill in chronological order so a
/// sparse or garbled ranking still produces useful suggestions.
fn apply_ranking(
    response: &JsonValue,
    candidates: &[Interval],
    tz: Tz,
) -> Vec<RescheduleSuggestion> {
    let keyed: Vec<(String, Interval)> = candidates
        .iter()
        .map(|slot| (wall_clock::to_wall_clock(slot.start, tz).to_string(), *slot))
        .collect();

    let mut used = vec![false; candidates.len()];
    let mut suggestions = Vec::new();

    let ranked = response
        .get("rankedTimes")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for entry in ranked {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        let Some(start) = entry.get("startTime").and_then(JsonValue::as_str) else {
            continue;
        };
        match keyed.iter().position(|(key, _)| key == start.trim()) {
            Some(position) if !used[position] => {
                used[position] = true;
                let reasoning = entry
                    .get("reasoning")
                    .and_then(JsonValue::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or(DEFAULT_REASONING);
                suggestions.push(RescheduleSuggestion {
                    slot: keyed[position].1,
                    reasoning: reasoning.to_string(),
                });
            }
            Some(_) => {}
            None => {
                debug!(
                    target: "engine::reschedule",
                    proposed = start,
                    "assistant proposed a time outside the candidate set, discarding"
                );
            }
        }
    }

    for (position, (_, slot)) in keyed.iter().enumerate() {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        if !used[position] {
            used[position] = true;
            suggestions.push(RescheduleSuggestion {
                slot: *slot,
                reasoning: DEFAULT_REASONING.to_string(),
            });
        }
    }

    suggestions
}
