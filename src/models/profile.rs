use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surgery {
    pub name: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injury {
    pub body_area: String,
    pub description: String,
    pub is_current: bool,
}

/// Demographic + medical-history snapshot read by the pipeline.
///
/// Owned by the onboarding/profile side of the application. The pipeline
/// clones it at the start of a run and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub sex: String,
    pub height_feet: u32,
    pub height_inches: u32,
    /// Pounds.
    pub weight: f64,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default)]
    pub other_medical_conditions: Option<String>,
    #[serde(default)]
    pub surgeries: Vec<Surgery>,
    #[serde(default)]
    pub injuries: Vec<Injury>,
    /// Free-form label, e.g. "Moderately Active". Interpreted by the scheduler.
    pub activity_level: String,
    #[serde(default)]
    pub primary_sport: Option<String>,
}

impl UserProfile {
    /// Whole years between date of birth and `today`. Zero for future birth dates.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn age(&self) -> u32 {
        self.age_on(Local::now().date_naive())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
