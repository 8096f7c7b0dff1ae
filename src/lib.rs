//! Timezone-correct daily scheduling engine.
//!
//! Builds one-day study schedules from tasks, class commitments, and an
//! optional planning assistant. All stored instants are UTC; wall-clock
//! readings are resolved per IANA timezone, DST transitions included. When
//! the assistant's proposal cannot be salvaged, a deterministic sequential
//! fallback produces the schedule instead.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{EngineError, EngineResult};
pub use models::block::{BlockType, ScheduleBlockData};
pub use models::commitment::{ClassCommitment, MeetingTime};
pub use models::interval::Interval;
pub use models::request::{SchedulingPreferences, SchedulingRequest, SchedulingResult};
pub use models::task::{TaskComplexity, TaskContext};
pub use services::assistant::ScheduleAssistant;
pub use services::planner::generate_schedule;
pub use services::reschedule::{suggest_reschedule, RescheduleSuggestion};
pub use services::wall_clock::{CalendarDate, LocalResolution, WallClockTime};
