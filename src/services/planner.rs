use tracing::{info, warn};

use crate::error::EngineResult;
use crate::models::request::{SchedulingRequest, SchedulingResult};
use crate::services::assistant::ScheduleAssistant;
use crate::services::fallback;
use crate::services::prompt_templates;
use crate::services::proposal;
use crate::services::wall_clock;

/// Generate a full schedule for the request's target date.
///
/// Policy, in order: an empty task list short-circuits to an empty result
/// (`"No tasks found"`) without touching the assistant; with an assistant,
/// its proposal is requested exactly once and pushed through the schema
/// check and the validator. Any recoverable failure along that path (the
/// assistant erroring, a garbled shape, every block rejected) degrades to
/// the deterministic sequential fallback with a warning. The assistant is
/// never retried. Unknown timezones and malformed target dates are caller
/// bugs and propagate as hard failures.
pub async fn generate_schedule(
    req: &SchedulingRequest,
    assistant: Option<&dyn ScheduleAssistant>,
) -> EngineResult<SchedulingResult> {
    // Caller-input failures surface before any scheduling path runs.
    wall_clock::lookup_timezone(&req.timezone)?;
    req.target_date.to_naive()?;

    if req.tasks.is_empty() {
        info!(target: "engine::planning", date = %req.target_date, "no tasks to schedule");
        return Ok(SchedulingResult {
            blocks: Vec::new(),
            reasoning: "Nothing to schedule for this date".to_string(),
            warnings: vec!["No tasks found".to_string()],
        });
    }

    let Some(assistant) = assistant else {
        info!(target: "engine::planning", "no assistant configured, using sequential fallback");
        return fallback::schedule_sequentially(req);
    };

    match propose_and_normalize(req, assistant).await {
        Ok(result) => {
            info!(
                target: "engine::planning",
                blocks = result.blocks.len(),
                warnings = result.warnings.len(),
                "assistant proposal accepted"
            );
            Ok(result)
        }
        Err(error) if error.is_recoverable() => {
            warn!(
                target: "engine::planning",
                %error,
                "assistant proposal unusable, degrading to sequential fallback"
            );
            let mut result = fallback::schedule_sequentially(req)?;
            result
                .warnings
                .insert(0, format!("assistant proposal unusable ({error})"));
            Ok(result)
        }
        Err(error) => Err(error),
    }
}

async fn propose_and_normalize(
    req: &SchedulingRequest,
    assistant: &dyn ScheduleAssistant,
) -> EngineResult<SchedulingResult> {
    let payload = prompt_templates::build_planning_payload(req);
    let raw = assistant.propose_schedule(&payload).await?;

    let plan = proposal::parse_plan(&raw)?;
    let normalized = proposal::normalize(&plan.blocks, req)?;

    let mut blocks = normalized.blocks;
    blocks.sort_by_key(|block| (block.start, block.end));

    let mut warnings = plan.warnings;
    warnings.extend(normalized.warnings);

    Ok(SchedulingResult {
        blocks,
        reasoning: plan
            .reasoning
            .unwrap_or_else(|| "Assistant-generated schedule".to_string()),
        warnings,
    })
}
