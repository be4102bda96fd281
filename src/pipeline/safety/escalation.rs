//! Rule-based red-flag screening of submitted assessments.
//!
//! Runs on the user's own input, independent of the model: we do not trust
//! the model alone to notice emergency patterns. Hits are attached to the
//! analysis result for prominent display and never change pipeline control
//! flow.

use std::collections::HashSet;

use crate::models::{PainAssessment, PainFrequency, PainOnset, ScreeningFlag, ScreeningSeverity};

/// A hard-coded screening rule.
struct ScreeningRule {
    /// Unique identifier for audit trail.
    id: &'static str,
    /// Fires when ANY condition matches.
    conditions: &'static [ScreeningCondition],
    severity: ScreeningSeverity,
    message: &'static str,
}

/// Condition under which a screening rule fires.
enum ScreeningCondition {
    /// Free text (notes, aggravating or relieving factors) contains any keyword.
    Keywords(&'static [&'static str]),
    /// Assessment is for this region key.
    Region(&'static str),
    /// Onset after an injury with intensity at or above the threshold.
    SevereAfterInjury { min_intensity: u8 },
    /// Night pain with nothing listed that relieves it.
    NightPainWithoutRelief,
}

// ── Keyword sets ────────────────────────────────────────────

static CAUDA_EQUINA_KEYWORDS: &[&str] = &[
    "saddle", "groin numb", "numb groin", "bladder", "bowel", "incontinen",
    "can't urinate", "cannot urinate", "trouble peeing", "both legs numb",
];

static FRACTURE_KEYWORDS: &[&str] = &[
    "deform", "can't bear weight", "cannot bear weight", "can't put weight",
    "heard a crack", "heard a snap", "bone sticking", "looks crooked",
];

static INFECTION_KEYWORDS: &[&str] = &[
    "fever", "chills", "oozing", "warm to the touch", "hot to the touch",
    "red and hot", "spreading redness",
];

static NEURO_KEYWORDS: &[&str] = &[
    "sudden weakness", "suddenly weak", "foot drop", "can't lift my", "cannot lift my",
    "losing grip", "dropping things", "paralys", "numbness spreading",
];

static NIGHT_PAIN_KEYWORDS: &[&str] = &[
    "night pain", "wakes me up", "keeps me up at night", "worse at night",
];

static CHEST_KEYWORDS: &[&str] = &[
    "chest pain", "chest pressure", "chest tightness", "shortness of breath",
    "short of breath", "pain down my left arm",
];

// ── Rule registry ───────────────────────────────────────────

/// Emergency rules first, then Urgent.
static RULES: &[ScreeningRule] = &[
    ScreeningRule {
        id: "RF-001",
        conditions: &[ScreeningCondition::Keywords(CAUDA_EQUINA_KEYWORDS)],
        severity: ScreeningSeverity::Emergency,
        message: "Numbness around the groin or changes in bladder or bowel control can signal \
            a serious nerve problem in the lower spine. Go to an emergency room right away.",
    },
    ScreeningRule {
        id: "RF-004",
        conditions: &[ScreeningCondition::Keywords(NEURO_KEYWORDS)],
        severity: ScreeningSeverity::Emergency,
        message: "New or sudden weakness or numbness needs to be checked by a doctor today. \
            If it came on suddenly, call emergency services.",
    },
    ScreeningRule {
        id: "RF-006",
        conditions: &[
            ScreeningCondition::Region("chest"),
            ScreeningCondition::Keywords(CHEST_KEYWORDS),
        ],
        severity: ScreeningSeverity::Emergency,
        message: "Chest pain can have causes that are not muscle or joint related. If the pain \
            is pressure-like, spreads to your arm or jaw, or comes with shortness of breath, \
            call emergency services now.",
    },
    ScreeningRule {
        id: "RF-002",
        conditions: &[
            ScreeningCondition::SevereAfterInjury { min_intensity: 8 },
            ScreeningCondition::Keywords(FRACTURE_KEYWORDS),
        ],
        severity: ScreeningSeverity::Urgent,
        message: "Severe pain after an injury, trouble bearing weight, or a visible deformity \
            can mean a fracture. Please get an X-ray at urgent care or an emergency room.",
    },
    ScreeningRule {
        id: "RF-003",
        conditions: &[ScreeningCondition::Keywords(INFECTION_KEYWORDS)],
        severity: ScreeningSeverity::Urgent,
        message: "Pain with fever, chills, or a hot and red area can be a sign of infection. \
            Please see a doctor today.",
    },
    ScreeningRule {
        id: "RF-005",
        conditions: &[
            ScreeningCondition::NightPainWithoutRelief,
            ScreeningCondition::Keywords(NIGHT_PAIN_KEYWORDS),
        ],
        severity: ScreeningSeverity::Urgent,
        message: "Pain at night that nothing relieves should be checked by a doctor soon, \
            especially if you also have weight loss or feel unwell.",
    },
];

// ── Matching logic ──────────────────────────────────────────

/// Screen every assessment against every rule. One flag per (rule, region).
pub fn screen_assessments(assessments: &[PainAssessment]) -> Vec<ScreeningFlag> {
    let mut flags = Vec::new();
    let mut seen: HashSet<(&'static str, String)> = HashSet::new();

    for assessment in assessments {
        let text = searchable_text(assessment);
        for rule in RULES {
            if !rule.conditions.iter().any(|c| c.matches(assessment, &text)) {
                continue;
            }
            if !seen.insert((rule.id, assessment.region.key.clone())) {
                continue;
            }

            tracing::warn!(
                rule_id = rule.id,
                severity = ?rule.severity,
                region = %assessment.region.key,
                "Screening rule fired"
            );

            flags.push(ScreeningFlag {
                rule_id: rule.id.to_string(),
                severity: rule.severity,
                region_key: assessment.region.key.clone(),
                message: rule.message.to_string(),
            });
        }
    }

    flags.sort_by_key(|f| f.severity);
    flags
}

fn searchable_text(assessment: &PainAssessment) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(notes) = &assessment.notes {
        parts.push(notes);
    }
    parts.extend(assessment.aggravating_factors.iter().map(String::as_str));
    parts.extend(assessment.relieving_factors.iter().map(String::as_str));
    parts.join(" \n ").to_lowercase()
}

impl ScreeningCondition {
    fn matches(&self, assessment: &PainAssessment, text_lower: &str) -> bool {
        match self {
            Self::Keywords(keywords) => keywords.iter().any(|kw| text_lower.contains(kw)),
            Self::Region(key) => assessment.region.key == *key,
            Self::SevereAfterInjury { min_intensity } => {
                assessment.onset == PainOnset::AfterInjury
                    && assessment.intensity() >= *min_intensity
            }
            Self::NightPainWithoutRelief => {
                assessment.frequency == PainFrequency::AtNight
                    && assessment
                        .relieving_factors
                        .iter()
                        .all(|f| f.trim().is_empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    fn assessment(
        region: &str,
        intensity: u8,
        frequency: PainFrequency,
        onset: PainOnset,
    ) -> PainAssessment {
        PainAssessment::new(
            find_region(region).unwrap(),
            PainType::Aching,
            intensity,
            PainDuration::FewDays,
            frequency,
            onset,
        )
        .unwrap()
    }

    fn plain(region: &str) -> PainAssessment {
        assessment(region, 4, PainFrequency::OnlyWithActivity, PainOnset::Gradual)
            .with_relieving(["rest"])
    }

    fn rule_ids(flags: &[ScreeningFlag]) -> Vec<&str> {
        flags.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn ordinary_knee_pain_raises_nothing() {
        let a = plain("left_knee").with_aggravating(["stairs", "running"]);
        assert!(screen_assessments(&[a]).is_empty());
    }

    #[test]
    fn bladder_change_fires_cauda_equina() {
        let a = plain("lower_back").with_notes("Some numbness in the saddle area and bladder trouble");
        let flags = screen_assessments(&[a]);
        assert_eq!(rule_ids(&flags), vec!["RF-001"]);
        assert_eq!(flags[0].severity, ScreeningSeverity::Emergency);
        assert_eq!(flags[0].region_key, "lower_back");
    }

    #[test]
    fn severe_pain_after_injury_fires_fracture() {
        let a = assessment("right_ankle_foot", 9, PainFrequency::Constant, PainOnset::AfterInjury)
            .with_relieving(["ice"]);
        assert_eq!(rule_ids(&screen_assessments(&[a])), vec!["RF-002"]);
    }

    #[test]
    fn moderate_pain_after_injury_is_not_fracture() {
        let a = assessment("right_ankle_foot", 5, PainFrequency::Constant, PainOnset::AfterInjury)
            .with_relieving(["ice"]);
        assert!(screen_assessments(&[a]).is_empty());
    }

    #[test]
    fn unrelieved_night_pain_fires() {
        let a = assessment("lower_back", 6, PainFrequency::AtNight, PainOnset::Gradual);
        assert_eq!(rule_ids(&screen_assessments(&[a])), vec!["RF-005"]);
    }

    #[test]
    fn night_pain_with_relief_is_quiet() {
        let a = assessment("lower_back", 6, PainFrequency::AtNight, PainOnset::Gradual)
            .with_relieving(["heat pack"]);
        assert!(screen_assessments(&[a]).is_empty());
    }

    #[test]
    fn chest_region_always_flags() {
        let flags = screen_assessments(&[plain("chest")]);
        assert_eq!(rule_ids(&flags), vec!["RF-006"]);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let a = plain("left_shoulder").with_notes("Had a FEVER and chills since Tuesday");
        assert_eq!(rule_ids(&screen_assessments(&[a])), vec!["RF-003"]);
    }

    #[test]
    fn one_flag_per_rule_and_region() {
        let a = plain("chest").with_notes("chest pain and chest pressure");
        assert_eq!(screen_assessments(&[a]).len(), 1);
    }

    #[test]
    fn emergency_flags_sort_first() {
        let fracture = assessment("left_knee", 9, PainFrequency::Constant, PainOnset::AfterInjury)
            .with_relieving(["rest"]);
        let neuro = plain("right_shoulder").with_notes("sudden weakness in my arm");
        let flags = screen_assessments(&[fracture, neuro]);
        assert_eq!(rule_ids(&flags), vec!["RF-004", "RF-002"]);
    }
}
