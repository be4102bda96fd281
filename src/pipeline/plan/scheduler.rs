//! Weekly exercise schedule from the profile's activity level.
//!
//! Every training day gets the whole exercise list; other days are rest.
//! Total over all inputs and always exactly seven slots (0 = Sunday).

use uuid::Uuid;

use crate::models::{RehabExercise, WeeklySchedule};

/// Activity levels the scheduler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    /// Case-insensitive; hyphens and underscores count as spaces.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label
            .trim()
            .to_lowercase()
            .replace(['-', '_'], " ");
        match normalized.as_str() {
            "sedentary" => Some(Self::Sedentary),
            "lightly active" => Some(Self::LightlyActive),
            "moderately active" => Some(Self::ModeratelyActive),
            "very active" => Some(Self::VeryActive),
            "athlete" => Some(Self::Athlete),
            _ => None,
        }
    }

    /// Training day indices within the week.
    pub fn training_days(self) -> &'static [usize] {
        match self {
            Self::Sedentary | Self::LightlyActive => MON_WED_FRI,
            Self::ModeratelyActive => &[1, 2, 4, 5],
            Self::VeryActive | Self::Athlete => &[1, 2, 3, 4, 5],
        }
    }
}

const MON_WED_FRI: &[usize] = &[1, 3, 5];

/// Training days for a free-text activity level. Unrecognized → Mon/Wed/Fri.
pub fn training_days(activity_level: &str) -> &'static [usize] {
    match ActivityLevel::parse(activity_level) {
        Some(level) => level.training_days(),
        None => {
            tracing::debug!(activity_level, "Unrecognized activity level, using 3-day schedule");
            MON_WED_FRI
        }
    }
}

/// Assign every exercise to every training day.
pub fn schedule(exercises: &[RehabExercise], activity_level: &str) -> WeeklySchedule {
    let ids: Vec<Uuid> = exercises.iter().map(|e| e.id).collect();
    let mut week: WeeklySchedule = Default::default();
    for &day in training_days(activity_level) {
        week[day] = ids.clone();
    }
    week
}
