pub mod prompt;
pub mod mapping;
pub mod orchestrator;

pub use mapping::{build_analysis_result, AnalysisRequest, AnalysisResponse};
pub use orchestrator::{AnalysisOrchestrator, AnalysisState};
pub use prompt::{analysis_system_prompt, analysis_user_message, profile_section};
