use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::block::{BlockType, ScheduleBlockData};
use crate::models::request::{SchedulingRequest, SchedulingResult};
use crate::services::wall_clock::{self};

const START_HOUR: u32 = 9;
const CUTOFF_HOUR: u32 = 22;
const GAP_MINUTES: i64 = 10;

/// Deterministic degraded-path scheduler: place tasks in input order from
/// 09:00 local, sized by complexity, with a fixed 10-minute gap. Class
/// commitments are deliberately ignored; the conflict trade-off is reported
/// in `warnings` rather than silently accepted. No block starts at or after
/// 22:00 local, and tasks that do not fit are reported, never dropped
/// silently.
pub fn schedule_sequentially(req: &SchedulingRequest) -> EngineResult<SchedulingResult> {
    let tz = wall_clock::lookup_timezone(&req.timezone)?;

    let mut warnings = vec!["fallback schedule ignores class times".to_string()];
    let mut blocks = Vec::with_capacity(req.tasks.len());
    let mut cursor = wall_clock::to_instant(&req.target_date.at(START_HOUR, 0, 0), tz)?;

    for (placed, task) in req.tasks.iter().enumerate() {
        let local = wall_clock::to_wall_clock(cursor, tz);
        // Stop at the evening cutoff, and never roll into the next day.
        if local.hour >= CUTOFF_HOUR || local.date() != req.target_date {
            let unplaced = req.tasks.len() - placed;
            warn!(
                target: "engine::fallback",
                unplaced,
                cursor = %local,
                "day is full before {CUTOFF_HOUR}:00, stopping placement"
            );
            warnings.push(format!(
                "{unplaced} task(s) could not be scheduled before {CUTOFF_HOUR}:00"
            ));
            break;
        }

        let end = cursor + Duration::minutes(task.complexity.default_minutes());
        blocks.push(ScheduleBlockData {
            id: Uuid::new_v4().to_string(),
            title: task.description.clone(),
            description: None,
            start: cursor,
            end,
            block_type: BlockType::Task,
            completed: false,
            task_id: Some(task.id.clone()),
            reasoning: Some("Scheduled sequentially".to_string()),
        });

        cursor = end + Duration::minutes(GAP_MINUTES);
    }

    info!(
        target: "engine::fallback",
        placed = blocks.len(),
        tasks = req.tasks.len(),
        "sequential fallback schedule built"
    );

    Ok(SchedulingResult {
        blocks,
        reasoning: format!(
            "Deterministic fallback: tasks placed in order from {START_HOUR:02}:00 local time"
        ),
        warnings,
    })
}
