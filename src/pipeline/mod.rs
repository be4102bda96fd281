pub mod recovery; // Lenient structured-output decoding
pub mod reasoning; // Reasoning-service client + failure taxonomy
pub mod assessment; // Per-region assessment state machine
pub(crate) mod task;
pub mod safety; // Rule-based red-flag screening of user input
pub mod analysis; // Condition analysis orchestrator
pub mod plan; // Rehab plan generator + scheduler
