pub mod config;
pub mod models;
pub mod persistence;
pub mod pipeline;

pub use persistence::{JsonFileStore, MemoryStore, PipelineStore, StoreError};
pub use pipeline::analysis::{AnalysisOrchestrator, AnalysisState};
pub use pipeline::assessment::{AssessmentSession, AssessmentSlot};
pub use pipeline::plan::{PlanGenerator, PlanOutcome, PlanSource, PlanState};
pub use pipeline::reasoning::{
    FailureKind, FailureNotice, HttpReasoningClient, ReasoningClient, ReasoningError,
    StaticTokenProvider, TokenProvider,
};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
