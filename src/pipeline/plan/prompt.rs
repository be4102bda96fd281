use chrono::NaiveDate;

use crate::models::AnalysisResult;
use crate::pipeline::analysis::profile_section;

/// Icons the display layer can render for an exercise.
pub const DEMONSTRATION_ICONS: &[&str] = &[
    "figure.flexibility",
    "figure.strengthtraining.traditional",
    "figure.cooldown",
    "figure.yoga",
    "figure.walk",
    "figure.stairs",
    "figure.core.training",
];

/// System prompt for plan generation.
pub fn plan_system_prompt() -> String {
    let icons: Vec<String> = DEMONSTRATION_ICONS.iter().map(|i| format!("\"{i}\"")).collect();
    format!(
        r#"You are a PT rehabilitation specialist. Create personalized exercise plans for musculoskeletal conditions. Educational purposes only.

RULES:
- Create 4-8 exercises with clear instructions, sets, reps, rest periods
- Match difficulty to activity level: sedentary→beginner, moderate→beginner+intermediate, active→intermediate+advanced
- Use these icons: {}
- Include 2-3 form tips and 1-2 contraindications per exercise
- Plan length is 4-8 weeks

Respond ONLY with valid JSON (no markdown):
{{"planName":"string","exercises":[{{"name":"string","targetArea":"string","description":"string","sets":number,"reps":"string","restSeconds":number,"difficulty":"beginner|intermediate|advanced","demonstrationIcon":"string","tips":["strings"],"contraindications":["strings"]}}],"totalWeeks":number(4-8),"notes":"string or null"}}"#,
        icons.join(", ")
    )
}

/// User message: profile recap plus every identified condition.
pub fn plan_user_message(analysis: &AnalysisResult, today: NaiveDate) -> String {
    let mut message = profile_section(&analysis.profile, today, false);
    message.push_str("\n\nIDENTIFIED CONDITIONS:\n");

    for condition in &analysis.conditions {
        message.push_str(&format!(
            "- {} (Confidence: {}%)\n  Explanation: {}\n",
            condition.condition_name,
            condition.confidence as i64,
            condition.explanation,
        ));
    }

    message.push_str("\nPlease create a personalized rehabilitation exercise plan for this patient.");
    message
}
