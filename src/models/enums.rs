use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + display_name + std::str::FromStr pattern.
/// The wire key doubles as the serde representation.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal, $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Human-readable label, as shown to the user and the reasoning service.
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

str_enum!(PainType {
    Sharp => "sharp", "Sharp",
    Dull => "dull", "Dull",
    Burning => "burning", "Burning",
    Throbbing => "throbbing", "Throbbing",
    Aching => "aching", "Aching",
    Stabbing => "stabbing", "Stabbing",
    Tingling => "tingling", "Tingling",
});

str_enum!(PainDuration {
    Today => "today", "Today",
    FewDays => "few_days", "A Few Days",
    OneToTwoWeeks => "one_to_two_weeks", "1-2 Weeks",
    TwoToFourWeeks => "two_to_four_weeks", "2-4 Weeks",
    OverAMonth => "over_a_month", "Over a Month",
    OverThreeMonths => "over_three_months", "Over 3 Months",
});

str_enum!(PainFrequency {
    Constant => "constant", "Constant",
    Intermittent => "intermittent", "Intermittent",
    OnlyWithActivity => "only_with_activity", "Only with Activity",
    OnlyAtRest => "only_at_rest", "Only at Rest",
    AtNight => "at_night", "At Night",
});

str_enum!(PainOnset {
    Sudden => "sudden", "Sudden",
    Gradual => "gradual", "Gradual",
    AfterInjury => "after_injury", "After Injury",
    AfterSurgery => "after_surgery", "After Surgery",
    Unknown => "unknown", "Unknown",
});

str_enum!(Difficulty {
    Beginner => "beginner", "Beginner",
    Intermediate => "intermediate", "Intermediate",
    Advanced => "advanced", "Advanced",
});

impl Difficulty {
    /// Lenient mapping for model output: case-insensitive, unknown labels become Beginner.
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Beginner,
        }
    }
}
