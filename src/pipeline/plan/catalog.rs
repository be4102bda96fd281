//! Static exercise catalog for plans built without the reasoning service.
//!
//! Keyed by exact clinical condition name. Pure lookup: no I/O, and the same
//! conditions always yield the same exercises (ids aside).

use uuid::Uuid;

use crate::models::Difficulty::{self, Beginner, Intermediate};
use crate::models::RehabExercise;

struct CatalogExercise {
    name: &'static str,
    target_area: &'static str,
    description: &'static str,
    sets: u32,
    reps: &'static str,
    rest_seconds: u32,
    difficulty: Difficulty,
    icon: &'static str,
    tips: &'static [&'static str],
    contraindications: &'static [&'static str],
}

impl CatalogExercise {
    fn instantiate(&self) -> RehabExercise {
        RehabExercise {
            id: Uuid::new_v4(),
            name: self.name.to_string(),
            target_area: self.target_area.to_string(),
            description: self.description.to_string(),
            sets: self.sets,
            reps: self.reps.to_string(),
            rest_seconds: self.rest_seconds,
            difficulty: self.difficulty,
            demonstration_icon: self.icon.to_string(),
            tips: self.tips.iter().map(|t| t.to_string()).collect(),
            contraindications: self.contraindications.iter().map(|c| c.to_string()).collect(),
        }
    }
}

// ── Condition entries ───────────────────────────────────────

static PATELLOFEMORAL: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Quad Sets",
        target_area: "Knee",
        description: "Sit with your leg straight. Tighten the muscle on top of your thigh by pressing the back of your knee into the floor. Hold for 5 seconds, then relax.",
        sets: 3,
        reps: "10-15",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Keep your leg straight.", "Press knee firmly into the floor.", "You should see your kneecap move upward."],
        contraindications: &["Avoid if acute knee swelling is present."],
    },
    CatalogExercise {
        name: "Straight Leg Raises",
        target_area: "Knee",
        description: "Lie on your back with one knee bent. Keeping the other leg straight, tighten the quad and lift the leg to 45 degrees. Hold 2 seconds, lower slowly.",
        sets: 3,
        reps: "10-12",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.strengthtraining.traditional",
        tips: &["Keep your core engaged.", "Lift slowly and with control.", "Don't arch your back."],
        contraindications: &["Avoid if hip pain worsens."],
    },
    CatalogExercise {
        name: "Wall Sits",
        target_area: "Knee",
        description: "Stand with your back against a wall. Slide down until your knees are bent to about 45 degrees. Hold the position.",
        sets: 3,
        reps: "30 seconds",
        rest_seconds: 45,
        difficulty: Intermediate,
        icon: "figure.cooldown",
        tips: &["Keep knees behind toes.", "Press your back flat against the wall.", "Start with a shallow bend and go deeper as you get stronger."],
        contraindications: &["Avoid deep bending if knee pain increases."],
    },
    CatalogExercise {
        name: "Clamshells",
        target_area: "Hip/Knee",
        description: "Lie on your side with knees bent to 45 degrees. Keeping your feet together, raise your top knee as high as you can without rotating your pelvis. Lower slowly.",
        sets: 3,
        reps: "12-15",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Keep your feet together throughout.", "Don't roll your hips backward.", "Focus on squeezing the glute."],
        contraindications: &["Avoid if hip pain is present."],
    },
];

static MENISCUS_TEAR: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Heel Slides",
        target_area: "Knee",
        description: "Lie on your back. Slowly slide your heel toward your buttock, bending your knee. Slide back to the starting position.",
        sets: 3,
        reps: "10-12",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Move slowly and smoothly.", "Only go as far as comfortable.", "Use a towel under your heel to reduce friction."],
        contraindications: &["Stop if you feel locking or catching."],
    },
    CatalogExercise {
        name: "Step-Ups",
        target_area: "Knee",
        description: "Step up onto a low step with your affected leg. Straighten your knee fully, then step back down slowly.",
        sets: 3,
        reps: "10",
        rest_seconds: 45,
        difficulty: Intermediate,
        icon: "figure.stairs",
        tips: &["Use a handrail for balance.", "Keep your knee aligned over your toes.", "Control the descent."],
        contraindications: &["Avoid if knee gives way or locks."],
    },
];

static ROTATOR_CUFF: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Pendulum Swings",
        target_area: "Shoulder",
        description: "Lean forward with your unaffected hand on a table. Let your affected arm hang down and swing in small circles, then back and forth.",
        sets: 2,
        reps: "30 seconds each direction",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.cooldown",
        tips: &["Keep your arm relaxed.", "Let gravity do the work.", "Gradually increase the circle size."],
        contraindications: &["Avoid if severe shoulder pain is present."],
    },
    CatalogExercise {
        name: "External Rotation",
        target_area: "Shoulder",
        description: "Stand with your elbow bent 90 degrees at your side. Rotate your forearm outward away from your body, keeping elbow tucked.",
        sets: 3,
        reps: "12-15",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.strengthtraining.traditional",
        tips: &["Keep your elbow at your side.", "Move slowly with control.", "Use a light resistance band if available."],
        contraindications: &["Stop if sharp pain occurs."],
    },
    CatalogExercise {
        name: "Scapular Squeezes",
        target_area: "Upper Back/Shoulder",
        description: "Sit or stand with arms at your sides. Squeeze your shoulder blades together as if pinching a pencil between them. Hold 5 seconds.",
        sets: 3,
        reps: "10-12",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.cooldown",
        tips: &["Keep shoulders down, away from ears.", "Don't shrug.", "Breathe normally while holding."],
        contraindications: &["Avoid if thoracic spine pain increases."],
    },
    CatalogExercise {
        name: "Wall Slides",
        target_area: "Shoulder",
        description: "Stand with your back against a wall, arms in a goalpost position. Slowly slide arms up the wall overhead, then back down.",
        sets: 3,
        reps: "10",
        rest_seconds: 30,
        difficulty: Intermediate,
        icon: "figure.flexibility",
        tips: &["Keep your back flat against the wall.", "Only go as high as comfortable.", "Focus on smooth movement."],
        contraindications: &["Avoid if impingement symptoms worsen."],
    },
];

static MUSCLE_STRAIN: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Cat-Cow Stretch",
        target_area: "Back",
        description: "On hands and knees, alternate between arching your back up (cat) and letting it sag down (cow). Move slowly with your breath.",
        sets: 2,
        reps: "10",
        rest_seconds: 20,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Inhale on cow, exhale on cat.", "Move through each position slowly.", "Keep your core lightly engaged."],
        contraindications: &["Avoid if back pain significantly worsens."],
    },
    CatalogExercise {
        name: "Glute Bridges",
        target_area: "Back/Glutes",
        description: "Lie on your back with knees bent. Squeeze your glutes and lift your hips toward the ceiling. Hold 2 seconds at the top.",
        sets: 3,
        reps: "12-15",
        rest_seconds: 30,
        difficulty: Beginner,
        icon: "figure.strengthtraining.traditional",
        tips: &["Don't arch your lower back excessively.", "Squeeze glutes at the top.", "Keep your core engaged."],
        contraindications: &["Avoid if acute back spasm is present."],
    },
    CatalogExercise {
        name: "Bird Dog",
        target_area: "Core/Back",
        description: "On hands and knees, extend one arm forward and the opposite leg backward. Hold for 3 seconds, return, and switch sides.",
        sets: 3,
        reps: "8 each side",
        rest_seconds: 30,
        difficulty: Intermediate,
        icon: "figure.yoga",
        tips: &["Keep your back flat like a table.", "Don't rotate your hips.", "Engage your core throughout."],
        contraindications: &["Modify if shoulder or hip pain occurs."],
    },
];

static HERNIATED_DISC: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Pelvic Tilts",
        target_area: "Lower Back",
        description: "Lie on your back with knees bent. Flatten your lower back against the floor by tilting your pelvis. Hold 5 seconds.",
        sets: 3,
        reps: "10-12",
        rest_seconds: 20,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Think of pulling your belly button to your spine.", "Breathe normally.", "The movement is subtle."],
        contraindications: &["Stop if radiating leg pain worsens."],
    },
    CatalogExercise {
        name: "Child's Pose",
        target_area: "Lower Back",
        description: "Kneel on the floor, sit back on your heels, and stretch your arms forward on the floor. Hold the position and breathe deeply.",
        sets: 2,
        reps: "30 seconds",
        rest_seconds: 20,
        difficulty: Beginner,
        icon: "figure.yoga",
        tips: &["Relax into the stretch.", "Breathe deeply.", "Widen your knees if needed."],
        contraindications: &["Avoid if knee pain prevents kneeling."],
    },
];

static IMPINGEMENT: &[CatalogExercise] = &[CatalogExercise {
    name: "Doorway Stretch",
    target_area: "Chest/Shoulder",
    description: "Stand in a doorway with arms on the frame at 90 degrees. Step forward to stretch the front of your shoulders and chest.",
    sets: 3,
    reps: "30 seconds",
    rest_seconds: 20,
    difficulty: Beginner,
    icon: "figure.flexibility",
    tips: &["Keep your core tight.", "Don't lean too far forward.", "You should feel the stretch across your chest."],
    contraindications: &["Avoid if shoulder pops or clicks."],
}];

static ACL_SPRAIN: &[CatalogExercise] = &[CatalogExercise {
    name: "Hamstring Curls",
    target_area: "Knee/Hamstring",
    description: "Stand holding a chair for balance. Slowly bend your knee to bring your heel toward your buttock. Lower slowly.",
    sets: 3,
    reps: "12-15",
    rest_seconds: 30,
    difficulty: Beginner,
    icon: "figure.strengthtraining.traditional",
    tips: &["Keep your thighs parallel.", "Control the movement.", "Use ankle weights for progression."],
    contraindications: &["Avoid if knee instability is severe."],
}];

static GENERAL: &[CatalogExercise] = &[
    CatalogExercise {
        name: "Gentle Stretching",
        target_area: "Full Body",
        description: "Perform gentle full-body stretches, holding each for 15-30 seconds. Focus on areas of tightness.",
        sets: 1,
        reps: "5-10 minutes",
        rest_seconds: 0,
        difficulty: Beginner,
        icon: "figure.flexibility",
        tips: &["Never bounce while stretching.", "Breathe deeply.", "Stop if you feel sharp pain."],
        contraindications: &["Avoid stretching acutely injured areas."],
    },
    CatalogExercise {
        name: "Walking",
        target_area: "General",
        description: "Walk at a comfortable pace. Start with 10 minutes and gradually increase duration.",
        sets: 1,
        reps: "10-20 minutes",
        rest_seconds: 0,
        difficulty: Beginner,
        icon: "figure.walk",
        tips: &["Wear supportive shoes.", "Walk on flat surfaces.", "Maintain good posture."],
        contraindications: &["Avoid if weight-bearing causes significant pain."],
    },
];

// ── Lookup ──────────────────────────────────────────────────

static CATALOG: &[(&str, &[CatalogExercise])] = &[
    ("Patellofemoral Pain Syndrome", PATELLOFEMORAL),
    ("Meniscus Tear", MENISCUS_TEAR),
    ("Rotator Cuff Strain", ROTATOR_CUFF),
    ("Muscle Strain", MUSCLE_STRAIN),
    ("Herniated Disc", HERNIATED_DISC),
    ("Impingement Syndrome", IMPINGEMENT),
    ("ACL Sprain", ACL_SPRAIN),
];

/// Clinical names with catalog entries.
pub fn catalog_conditions() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

/// Exercises for one clinical name. Exact, case-sensitive match.
pub fn exercises_for(condition: &str) -> Vec<RehabExercise> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == condition)
        .map(|(_, entries)| entries.iter().map(CatalogExercise::instantiate).collect())
        .unwrap_or_default()
}

/// Gentle stretching and walking.
pub fn general_exercises() -> Vec<RehabExercise> {
    GENERAL.iter().map(CatalogExercise::instantiate).collect()
}

/// Concatenated catalog exercises for every matching condition, in condition
/// order. Never empty: falls back to the general set.
pub fn fallback_exercises(conditions: &[String]) -> Vec<RehabExercise> {
    let exercises: Vec<RehabExercise> = conditions
        .iter()
        .flat_map(|c| exercises_for(c))
        .collect();
    if exercises.is_empty() {
        general_exercises()
    } else {
        exercises
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(exercises: &[RehabExercise]) -> Vec<&str> {
        exercises.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn known_condition_returns_its_entries() {
        let exercises = exercises_for("Meniscus Tear");
        assert_eq!(names(&exercises), vec!["Heel Slides", "Step-Ups"]);
        assert_eq!(exercises[1].difficulty, Difficulty::Intermediate);
        assert_eq!(exercises[1].demonstration_icon, "figure.stairs");
    }

    #[test]
    fn lookup_is_exact_match() {
        assert!(exercises_for("meniscus tear").is_empty());
        assert!(exercises_for("Meniscus Tear ").is_empty());
    }

    #[test]
    fn matched_conditions_concatenate_in_order() {
        let conditions = vec![
            "Impingement Syndrome".to_string(),
            "Unknown Thing".to_string(),
            "ACL Sprain".to_string(),
        ];
        assert_eq!(
            names(&fallback_exercises(&conditions)),
            vec!["Doorway Stretch", "Hamstring Curls"]
        );
    }

    #[test]
    fn no_match_uses_general_set() {
        let exercises = fallback_exercises(&["Plantar Fasciitis".to_string()]);
        assert_eq!(names(&exercises), vec!["Gentle Stretching", "Walking"]);
        assert_eq!(fallback_exercises(&[]).len(), 2);
    }

    #[test]
    fn every_entry_is_well_formed() {
        for condition in catalog_conditions() {
            let exercises = exercises_for(condition);
            assert!(!exercises.is_empty(), "{condition} has no exercises");
            for e in exercises {
                assert!(e.sets >= 1);
                assert!(!e.tips.is_empty());
                assert!(!e.contraindications.is_empty());
                assert!(crate::pipeline::plan::DEMONSTRATION_ICONS.contains(&e.demonstration_icon.as_str()));
            }
        }
    }

    #[test]
    fn instances_get_fresh_ids() {
        let a = general_exercises();
        let b = general_exercises();
        assert_ne!(a[0].id, b[0].id);
        assert_eq!(a[0].name, b[0].name);
    }
}
