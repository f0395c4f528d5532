/// Sport contexts and their diagnostically important joints

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::landmark::PoseLandmark;

/// Sport context selecting key joints and coaching vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    Football,
    Basketball,
    Boxing,
    Mma,
    Taekwondo,
    AmericanFootball,
    /// Any identifier outside the known vocabulary
    Generic,
}

impl Discipline {
    /// Known disciplines, excluding the generic fallback
    pub const KNOWN: [Discipline; 6] = [
        Self::Football,
        Self::Basketball,
        Self::Boxing,
        Self::Mma,
        Self::Taekwondo,
        Self::AmericanFootball,
    ];

    /// Parse a sport identifier. Unknown identifiers map to `Generic`.
    pub fn parse(identifier: &str) -> Self {
        match identifier.trim().to_lowercase().as_str() {
            "football" | "soccer" => Self::Football,
            "basketball" => Self::Basketball,
            "boxing" => Self::Boxing,
            "mma" => Self::Mma,
            "taekwondo" => Self::Taekwondo,
            "american-football" | "american_football" => Self::AmericanFootball,
            _ => Self::Generic,
        }
    }

    /// Wire identifier
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Football => "football",
            Self::Basketball => "basketball",
            Self::Boxing => "boxing",
            Self::Mma => "mma",
            Self::Taekwondo => "taekwondo",
            Self::AmericanFootball => "american-football",
            Self::Generic => "generic",
        }
    }

    /// Human readable name used in summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Football => "Football",
            Self::Basketball => "Basketball",
            Self::Boxing => "Boxing",
            Self::Mma => "MMA",
            Self::Taekwondo => "Taekwondo",
            Self::AmericanFootball => "American Football",
            Self::Generic => "General Athletics",
        }
    }

    /// Landmarks highlighted by the renderer and emphasised in summaries
    pub fn key_joints(&self) -> &'static [PoseLandmark] {
        use PoseLandmark::*;

        match self {
            Self::Football => &[LeftHip, RightHip, LeftKnee, RightKnee, LeftAnkle, RightAnkle],
            Self::Basketball => &[
                LeftShoulder,
                RightShoulder,
                LeftElbow,
                RightElbow,
                LeftWrist,
                RightWrist,
                LeftKnee,
                RightKnee,
            ],
            Self::Boxing => &[
                LeftShoulder,
                RightShoulder,
                LeftElbow,
                RightElbow,
                LeftWrist,
                RightWrist,
            ],
            Self::Mma => &[
                LeftShoulder,
                RightShoulder,
                LeftElbow,
                RightElbow,
                LeftHip,
                RightHip,
                LeftKnee,
                RightKnee,
            ],
            Self::Taekwondo => &[
                LeftHip,
                RightHip,
                LeftKnee,
                RightKnee,
                LeftAnkle,
                RightAnkle,
                LeftFootIndex,
                RightFootIndex,
            ],
            Self::AmericanFootball => &[LeftShoulder, RightShoulder, LeftHip, RightHip, LeftKnee, RightKnee],
            Self::Generic => &[],
        }
    }

    /// Whether a landmark index is a key joint for this discipline
    pub fn is_key_joint(&self, index: usize) -> bool {
        self.key_joints().iter().any(|lm| lm.index() == index)
    }
}

impl Default for Discipline {
    fn default() -> Self {
        Self::Generic
    }
}

impl From<&str> for Discipline {
    fn from(identifier: &str) -> Self {
        Self::parse(identifier)
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
