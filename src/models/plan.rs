use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Difficulty;

/// Day index 0 = Sunday .. 6 = Saturday; each slot lists exercise ids.
pub type WeeklySchedule = [Vec<Uuid>; 7];

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabExercise {
    pub id: Uuid,
    pub name: String,
    pub target_area: String,
    pub description: String,
    pub sets: u32,
    /// Free-form: "10-12", "30 seconds", "8 each side".
    pub reps: String,
    pub rest_seconds: u32,
    pub difficulty: Difficulty,
    pub demonstration_icon: String,
    pub tips: Vec<String>,
    pub contraindications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabPlan {
    pub id: Uuid,
    pub plan_name: String,
    /// Clinical names of the conditions the plan was built for.
    pub conditions: Vec<String>,
    pub exercises: Vec<RehabExercise>,
    pub weekly_schedule: WeeklySchedule,
    pub total_weeks: u32,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl RehabPlan {
    /// Exercises scheduled on `day` (0 = Sunday). Empty for rest days or out-of-range indices.
    pub fn exercises_on(&self, day: usize) -> Vec<&RehabExercise> {
        let Some(ids) = self.weekly_schedule.get(day) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| self.exercises.iter().find(|e| e.id == *id))
            .collect()
    }

    pub fn active_days(&self) -> usize {
        self.weekly_schedule.iter().filter(|d| !d.is_empty()).count()
    }
}
