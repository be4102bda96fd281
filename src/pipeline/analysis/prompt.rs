use chrono::NaiveDate;

use crate::models::{PainAssessment, UserProfile, ANALYSIS_DISCLAIMER};

/// System prompt for condition analysis.
pub fn analysis_system_prompt() -> String {
    format!(
        r#"You are a friendly health guide helping everyday people understand their pain. Explain things the way you would to a friend, without medical jargon. This is educational only and not a diagnosis.

AUDIENCE: People who may not be able to see a doctor right away and need to understand, in plain language, what might be going on in their body.

RULES:
- Return the top 3 possible conditions, each with a confidence from 0 to 100
- "conditionName": the clinical name (e.g. "Patellofemoral Pain Syndrome")
- "commonName": a plain-English name anyone would understand (e.g. "Runner's Knee")
- "explanation": 2-3 simple sentences on what the condition is and why it matches. If a medical term is unavoidable, explain it in parentheses
- "whatItMeans": 2-3 sentences on what is physically happening inside the body, in plain terms
- "howToManage": 2-3 sentences of specific, practical things they can start doing at home today
- "nextSteps": 3-5 concrete, plainly worded actions (e.g. "Ice the area for 15 minutes twice a day")
- "overallSummary": 2-3 sentences speaking directly to the person ("you/your"). Reassuring but honest
- Set "isRedFlag" to true for: cauda equina signs, suspected fractures, infection signs, spinal cord involvement, night pain without relief, sudden weakness or new numbness, chest pain. When true, "redFlagMessage" MUST explain in urgent, clear language what to do

Respond ONLY with valid JSON (no markdown fences):
{{"conditions":[{{"conditionName":"string","commonName":"string","confidence":number,"explanation":"string","whatItMeans":"string","howToManage":"string","isRedFlag":boolean,"redFlagMessage":"string or null","nextSteps":["strings"]}}],"overallSummary":"string","disclaimerText":"{ANALYSIS_DISCLAIMER}"}}"#
    )
}

/// Profile recap shared by the analysis and plan prompts.
pub fn profile_section(profile: &UserProfile, today: NaiveDate, include_other: bool) -> String {
    let mut section = format!(
        "PATIENT PROFILE:\n\
         - Age: {} years old\n\
         - Sex: {}\n\
         - Height: {}'{}\"\n\
         - Weight: {} lbs\n\
         - Activity Level: {}",
        profile.age_on(today),
        profile.sex,
        profile.height_feet,
        profile.height_inches,
        profile.weight as i64,
        profile.activity_level,
    );

    if let Some(sport) = profile.primary_sport.as_deref().filter(|s| !s.is_empty()) {
        section.push_str(&format!("\n- Primary Sport/Activity: {sport}"));
    }

    if !profile.medical_conditions.is_empty() {
        section.push_str(&format!(
            "\n- Medical Conditions: {}",
            profile.medical_conditions.join(", ")
        ));
    }

    if include_other {
        if let Some(other) = profile
            .other_medical_conditions
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            section.push_str(&format!("\n- Other Medical Conditions: {other}"));
        }
    }

    if !profile.surgeries.is_empty() {
        let surgeries: Vec<String> = profile
            .surgeries
            .iter()
            .map(|s| format!("{} ({})", s.name, s.year))
            .collect();
        section.push_str(&format!("\n- Past Surgeries: {}", surgeries.join(", ")));
    }

    if !profile.injuries.is_empty() {
        let injuries: Vec<String> = profile
            .injuries
            .iter()
            .map(|i| {
                let status = if i.is_current { "current" } else { "past" };
                format!("{}: {} ({status})", i.body_area, i.description)
            })
            .collect();
        section.push_str(&format!("\n- Injuries: {}", injuries.join("; ")));
    }

    section
}

/// User message: profile recap plus every completed assessment, in region order.
pub fn analysis_user_message(
    assessments: &[PainAssessment],
    profile: &UserProfile,
    today: NaiveDate,
) -> String {
    let mut message = profile_section(profile, today, true);
    message.push_str("\n\nPAIN ASSESSMENTS:\n");

    for (index, a) in assessments.iter().enumerate() {
        message.push_str(&format!(
            "\n--- Region {}: {} ---\n\
             - Pain Type: {}\n\
             - Pain Intensity: {}/10\n\
             - Duration: {}\n\
             - Frequency: {}\n\
             - Onset: {}",
            index + 1,
            a.region.name,
            a.pain_type.display_name(),
            a.intensity(),
            a.duration.display_name(),
            a.frequency.display_name(),
            a.onset.display_name(),
        ));

        if !a.aggravating_factors.is_empty() {
            message.push_str(&format!(
                "\n- Aggravating Factors: {}",
                a.aggravating_factors.join(", ")
            ));
        }
        if !a.relieving_factors.is_empty() {
            message.push_str(&format!(
                "\n- Relieving Factors: {}",
                a.relieving_factors.join(", ")
            ));
        }
        if let Some(notes) = a.notes.as_deref().filter(|n| !n.is_empty()) {
            message.push_str(&format!("\n- Additional Notes: {notes}"));
        }
    }

    message.push_str("\n\nPlease analyze these symptoms and provide your assessment.");
    message
}
