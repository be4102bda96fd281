//! Wire schema of the analysis response and its mapping into domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::{AnalysisOptions, ConditionRanking};
use crate::models::{
    AnalysisResult, ConditionResult, PainAssessment, ScreeningFlag, UserProfile,
    ANALYSIS_DISCLAIMER, DEFAULT_RED_FLAG_MESSAGE,
};
use crate::pipeline::recovery::ResponseSchema;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub conditions: Vec<WireCondition>,
    pub overall_summary: String,
    /// Requested from the model but replaced with the fixed disclaimer.
    #[serde(default)]
    pub disclaimer_text: Option<String>,
}

impl ResponseSchema for AnalysisResponse {
    const NAME: &'static str = "analysis";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCondition {
    pub condition_name: String,
    pub common_name: String,
    pub confidence: f64,
    pub explanation: String,
    pub what_it_means: String,
    pub how_to_manage: String,
    pub is_red_flag: bool,
    #[serde(default)]
    pub red_flag_message: Option<String>,
    pub next_steps: Vec<String>,
}

/// Inputs captured when the run started.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub assessments: Vec<PainAssessment>,
    pub profile: UserProfile,
}

/// Assemble the immutable result. Enforces the display limit, the confidence
/// range, and a non-empty message on every red flag.
pub fn build_analysis_result(
    response: AnalysisResponse,
    request: AnalysisRequest,
    screening_flags: Vec<ScreeningFlag>,
    options: &AnalysisOptions,
    generated_at: DateTime<Utc>,
) -> AnalysisResult {
    let returned = response.conditions.len();
    let conditions: Vec<ConditionResult> = rank_conditions(response.conditions, options)
        .into_iter()
        .map(to_condition)
        .collect();

    if returned > conditions.len() {
        tracing::debug!(
            returned,
            kept = conditions.len(),
            ranking = ?options.ranking,
            "Truncated model conditions"
        );
    }

    AnalysisResult {
        id: Uuid::new_v4(),
        assessments: request.assessments,
        conditions,
        overall_summary: response.overall_summary.trim().to_string(),
        disclaimer_text: ANALYSIS_DISCLAIMER.to_string(),
        generated_at,
        profile: request.profile,
        screening_flags,
    }
}

fn rank_conditions(mut conditions: Vec<WireCondition>, options: &AnalysisOptions) -> Vec<WireCondition> {
    if options.ranking == ConditionRanking::ByConfidence {
        // Stable: ties keep model order.
        conditions.sort_by(|a, b| {
            clamp_confidence(b.confidence).total_cmp(&clamp_confidence(a.confidence))
        });
    }
    conditions.truncate(options.max_conditions);
    conditions
}

fn to_condition(wire: WireCondition) -> ConditionResult {
    let message = wire
        .red_flag_message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let red_flag_message = if wire.is_red_flag && message.is_none() {
        tracing::warn!(
            condition = %wire.condition_name,
            "Red flag without message; substituting default"
        );
        Some(DEFAULT_RED_FLAG_MESSAGE.to_string())
    } else {
        message
    };

    ConditionResult {
        id: Uuid::new_v4(),
        condition_name: wire.condition_name.trim().to_string(),
        common_name: wire.common_name.trim().to_string(),
        confidence: clamp_confidence(wire.confidence),
        explanation: wire.explanation,
        what_it_means: wire.what_it_means,
        how_to_manage: wire.how_to_manage,
        is_red_flag: wire.is_red_flag,
        red_flag_message,
        next_steps: wire.next_steps,
    }
}

/// Into 0..=100; NaN becomes 0.
fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
