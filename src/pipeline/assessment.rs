//! Multi-region assessment state machine.
//!
//! One slot per selected region, filled as the user completes each region's
//! form. Pure and synchronous: no I/O, no clocks. Navigation is clamped to the
//! slot range and never wraps.

use crate::models::{BodyRegion, PainAssessment, UserProfile};

/// A region's assessment slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssessmentSlot {
    #[default]
    Empty,
    Filled(PainAssessment),
}

impl AssessmentSlot {
    pub fn as_filled(&self) -> Option<&PainAssessment> {
        match self {
            Self::Filled(assessment) => Some(assessment),
            Self::Empty => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    profile: UserProfile,
    regions: Vec<BodyRegion>,
    slots: Vec<AssessmentSlot>,
    current: usize,
}

impl AssessmentSession {
    /// Takes ownership of snapshots; later changes to the caller's profile do not leak in.
    pub fn new(profile: UserProfile, regions: Vec<BodyRegion>) -> Self {
        let slots = vec![AssessmentSlot::Empty; regions.len()];
        Self {
            profile,
            regions,
            slots,
            current: 0,
        }
    }

    /// Overwrite the slot at the current index. No-op when there are no regions.
    pub fn save_current(&mut self, assessment: PainAssessment) {
        if let Some(slot) = self.slots.get_mut(self.current) {
            *slot = AssessmentSlot::Filled(assessment);
        }
    }

    pub fn save_and_advance(&mut self, assessment: PainAssessment) {
        self.save_current(assessment);
        self.current = (self.current + 1).min(self.last_index());
    }

    pub fn save_and_go_back(&mut self, assessment: PainAssessment) {
        self.save_current(assessment);
        self.current = self.current.saturating_sub(1);
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_region(&self) -> Option<&BodyRegion> {
        self.regions.get(self.current)
    }

    /// Saved assessment for the current region, for restoring the form.
    pub fn current_assessment(&self) -> Option<&PainAssessment> {
        self.slots.get(self.current).and_then(AssessmentSlot::as_filled)
    }

    pub fn is_last_region(&self) -> bool {
        !self.regions.is_empty() && self.current == self.last_index()
    }

    pub fn total_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn slots(&self) -> &[AssessmentSlot] {
        &self.slots
    }

    /// Filled slots, in region order.
    pub fn completed_assessments(&self) -> Vec<PainAssessment> {
        self.slots
            .iter()
            .filter_map(AssessmentSlot::as_filled)
            .cloned()
            .collect()
    }

    pub fn has_completed(&self) -> bool {
        self.slots.iter().any(AssessmentSlot::is_filled)
    }

    pub fn selected_region_names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    fn last_index(&self) -> usize {
        self.regions.len().saturating_sub(1)
    }
}
