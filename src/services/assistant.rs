use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::EngineResult;

/// Narrow seam to the external natural-language planning assistant.
///
/// Injected by the caller; the engine never owns a client or reaches into
/// globals, so tests swap in a deterministic fake. Both methods return raw
/// JSON because nothing the assistant says is trusted: responses go
/// through schema checks and the proposal validator before any field is
/// used.
#[async_trait]
pub trait ScheduleAssistant: Send + Sync {
    /// Propose a full day schedule for the planning payload. The payload
    /// instructs the assistant to emit local `YYYY-MM-DDTHH:mm:ss`
    /// timestamps with no timezone suffix.
    async fn propose_schedule(&self, payload: &JsonValue) -> EngineResult<JsonValue>;

    /// Rank the candidate reschedule slots in the payload. The assistant
    /// may only choose among the supplied candidates; anything else is
    /// discarded by the advisor.
    async fn rank_slots(&self, payload: &JsonValue) -> EngineResult<JsonValue>;
}
