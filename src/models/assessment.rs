use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BodyRegion, ModelError, PainDuration, PainFrequency, PainOnset, PainType};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;

/// Structured pain description for one selected region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPainAssessment")]
pub struct PainAssessment {
    pub id: Uuid,
    pub region: BodyRegion,
    pub pain_type: PainType,
    intensity: u8,
    pub duration: PainDuration,
    pub frequency: PainFrequency,
    pub onset: PainOnset,
    #[serde(default)]
    pub aggravating_factors: Vec<String>,
    #[serde(default)]
    pub relieving_factors: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PainAssessment {
    pub fn new(
        region: BodyRegion,
        pain_type: PainType,
        intensity: u8,
        duration: PainDuration,
        frequency: PainFrequency,
        onset: PainOnset,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            id: Uuid::new_v4(),
            region,
            pain_type,
            intensity: check_intensity(intensity)?,
            duration,
            frequency,
            onset,
            aggravating_factors: Vec::new(),
            relieving_factors: Vec::new(),
            notes: None,
        })
    }

    pub fn with_aggravating<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggravating_factors = factors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_relieving<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relieving_factors = factors.into_iter().map(Into::into).collect();
        self
    }

    /// Blank notes are stored as `None`.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    /// 1..=10.
    pub fn intensity(&self) -> u8 {
        self.intensity
    }
}

fn check_intensity(intensity: u8) -> Result<u8, ModelError> {
    if (MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity) {
        Ok(intensity)
    } else {
        Err(ModelError::IntensityOutOfRange(intensity))
    }
}

/// Wire shape of `PainAssessment`; decoding goes through the same range check as `new`.
#[derive(Deserialize)]
struct RawPainAssessment {
    id: Uuid,
    region: BodyRegion,
    pain_type: PainType,
    intensity: u8,
    duration: PainDuration,
    frequency: PainFrequency,
    onset: PainOnset,
    #[serde(default)]
    aggravating_factors: Vec<String>,
    #[serde(default)]
    relieving_factors: Vec<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawPainAssessment> for PainAssessment {
    type Error = ModelError;

    fn try_from(raw: RawPainAssessment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id,
            region: raw.region,
            pain_type: raw.pain_type,
            intensity: check_intensity(raw.intensity)?,
            duration: raw.duration,
            frequency: raw.frequency,
            onset: raw.onset,
            aggravating_factors: raw.aggravating_factors,
            relieving_factors: raw.relieving_factors,
            notes: raw.notes,
        })
    }
}
