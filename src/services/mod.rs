pub mod assistant;
pub mod fallback;
pub mod free_slots;
pub mod planner;
pub mod prompt_templates;
pub mod proposal;
pub mod reschedule;
pub mod wall_clock;
