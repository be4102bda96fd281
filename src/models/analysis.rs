use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PainAssessment, UserProfile};

/// Shown under every analysis, regardless of what the model returned.
pub const ANALYSIS_DISCLAIMER: &str = "This is not a medical diagnosis. It is a starting point \
to help you understand what might be going on. If your pain is severe, getting worse, or not \
improving, please see a doctor or visit an urgent care clinic.";

/// Substituted when a condition is flagged urgent but carries no message.
pub const DEFAULT_RED_FLAG_MESSAGE: &str = "This may need urgent medical attention. \
Please see a doctor or visit an urgent care clinic as soon as possible.";

/// One ranked candidate condition. Not a clinical diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub id: Uuid,
    /// Clinical name; also the fallback catalog key.
    pub condition_name: String,
    pub common_name: String,
    /// 0..=100.
    pub confidence: f64,
    pub explanation: String,
    pub what_it_means: String,
    pub how_to_manage: String,
    pub is_red_flag: bool,
    /// Always non-empty when `is_red_flag` is set.
    pub red_flag_message: Option<String>,
    pub next_steps: Vec<String>,
}

/// Severity of a deterministic screening hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScreeningSeverity {
    /// Seek emergency care now.
    Emergency,
    /// See a doctor the same day.
    Urgent,
}

/// Rule-based red flag raised from the submitted assessments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningFlag {
    pub rule_id: String,
    pub severity: ScreeningSeverity,
    pub region_key: String,
    pub message: String,
}

/// Output of one analysis run. Immutable once built; the sole input to plan generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub assessments: Vec<PainAssessment>,
    pub conditions: Vec<ConditionResult>,
    pub overall_summary: String,
    pub disclaimer_text: String,
    pub generated_at: DateTime<Utc>,
    pub profile: UserProfile,
    #[serde(default)]
    pub screening_flags: Vec<ScreeningFlag>,
}

impl AnalysisResult {
    pub fn has_red_flag(&self) -> bool {
        self.conditions.iter().any(|c| c.is_red_flag) || !self.screening_flags.is_empty()
    }

    pub fn condition_names(&self) -> Vec<String> {
        self.conditions
            .iter()
            .map(|c| c.condition_name.clone())
            .collect()
    }
}
