use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Front,
    Back,
}

/// An anatomical zone a user can flag as painful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyRegion {
    /// Stable identifier, e.g. `left_knee`.
    pub key: String,
    pub name: String,
    pub sides: Vec<BodySide>,
    #[serde(default)]
    pub selected: bool,
}

impl BodyRegion {
    pub fn new(key: &str, name: &str, sides: &[BodySide]) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            sides: sides.to_vec(),
            selected: false,
        }
    }

    pub fn is_visible_on(&self, side: BodySide) -> bool {
        self.sides.contains(&side)
    }
}

const FRONT: &[BodySide] = &[BodySide::Front];
const BACK: &[BodySide] = &[BodySide::Back];
const BOTH: &[BodySide] = &[BodySide::Front, BodySide::Back];

/// Static reference data, in declaration order.
const REGION_CATALOG: &[(&str, &str, &[BodySide])] = &[
    ("head_neck", "Head/Neck", FRONT),
    ("chest", "Chest", FRONT),
    ("abdomen", "Abdomen", FRONT),
    ("upper_back", "Upper Back", BACK),
    ("lower_back", "Lower Back", BACK),
    ("left_shoulder", "Left Shoulder", BOTH),
    ("right_shoulder", "Right Shoulder", BOTH),
    ("left_elbow", "Left Elbow", BOTH),
    ("right_elbow", "Right Elbow", BOTH),
    ("left_wrist_hand", "Left Wrist/Hand", BOTH),
    ("right_wrist_hand", "Right Wrist/Hand", BOTH),
    ("left_hip", "Left Hip", BOTH),
    ("right_hip", "Right Hip", BOTH),
    ("left_knee", "Left Knee", BOTH),
    ("right_knee", "Right Knee", BOTH),
    ("left_ankle_foot", "Left Ankle/Foot", BOTH),
    ("right_ankle_foot", "Right Ankle/Foot", BOTH),
];

/// Fresh, unselected copy of the region catalog.
pub fn body_regions() -> Vec<BodyRegion> {
    REGION_CATALOG
        .iter()
        .map(|(key, name, sides)| BodyRegion::new(key, name, sides))
        .collect()
}

/// Look up one catalog region by key.
pub fn find_region(key: &str) -> Option<BodyRegion> {
    REGION_CATALOG
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(key, name, sides)| BodyRegion::new(key, name, sides))
}

/// Region picker state. Selection order is catalog declaration order.
#[derive(Debug, Clone)]
pub struct RegionSelection {
    regions: Vec<BodyRegion>,
}

impl Default for RegionSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionSelection {
    pub fn new() -> Self {
        Self {
            regions: body_regions(),
        }
    }

    /// Flip the selection flag. Returns the new state, or `None` for an unknown key.
    pub fn toggle(&mut self, key: &str) -> Option<bool> {
        let region = self.regions.iter_mut().find(|r| r.key == key)?;
        region.selected = !region.selected;
        Some(region.selected)
    }

    pub fn clear_all(&mut self) {
        for region in &mut self.regions {
            region.selected = false;
        }
    }

    pub fn all(&self) -> &[BodyRegion] {
        &self.regions
    }

    pub fn selected(&self) -> Vec<BodyRegion> {
        self.regions.iter().filter(|r| r.selected).cloned().collect()
    }

    pub fn has_selection(&self) -> bool {
        self.regions.iter().any(|r| r.selected)
    }

    pub fn for_side(&self, side: BodySide) -> impl Iterator<Item = &BodyRegion> {
        self.regions.iter().filter(move |r| r.is_visible_on(side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let regions = body_regions();
        let mut keys: Vec<_> = regions.iter().map(|r| r.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), regions.len());
    }

    #[test]
    fn catalog_starts_unselected() {
        assert!(body_regions().iter().all(|r| !r.selected));
    }

    #[test]
    fn back_only_regions_hidden_from_front() {
        let selection = RegionSelection::new();
        let front: Vec<_> = selection.for_side(BodySide::Front).map(|r| r.key.as_str()).collect();
        assert!(!front.contains(&"lower_back"));
        assert!(front.contains(&"left_knee"));
        let back: Vec<_> = selection.for_side(BodySide::Back).map(|r| r.key.as_str()).collect();
        assert!(!back.contains(&"chest"));
    }

    #[test]
    fn selection_follows_declaration_order() {
        let mut selection = RegionSelection::new();
        selection.toggle("right_knee");
        selection.toggle("lower_back");
        let names: Vec<_> = selection.selected().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Lower Back", "Right Knee"]);
    }

    #[test]
    fn toggle_twice_deselects() {
        let mut selection = RegionSelection::new();
        assert_eq!(selection.toggle("chest"), Some(true));
        assert_eq!(selection.toggle("chest"), Some(false));
        assert!(!selection.has_selection());
        assert_eq!(selection.toggle("tail"), None);
    }

    #[test]
    fn clear_all_resets() {
        let mut selection = RegionSelection::new();
        selection.toggle("chest");
        selection.toggle("abdomen");
        selection.clear_all();
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn find_region_by_key() {
        let knee = find_region("left_knee").unwrap();
        assert_eq!(knee.name, "Left Knee");
        assert!(find_region("nose").is_none());
    }
}
