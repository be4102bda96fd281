pub mod prompt;
pub mod catalog;
pub mod scheduler;
pub mod generator;

pub use catalog::{fallback_exercises, general_exercises};
pub use generator::{
    build_fallback_plan, build_model_plan, PlanGenerator, PlanOutcome, PlanResponse, PlanSource,
    PlanState,
};
pub use prompt::{plan_system_prompt, plan_user_message, DEMONSTRATION_ICONS};
pub use scheduler::{schedule, ActivityLevel};
