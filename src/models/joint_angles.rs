use serde::{Deserialize, Serialize};

/// Anatomical joints for which an angle is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftKnee,
    RightKnee,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
}

impl Joint {
    pub const ALL: [Joint; 8] = [
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
        }
    }
}

/// Joint angles for one frame, in degrees.
///
/// A value of `0.0` means the angle could not be computed because one of its
/// three landmarks was not visible enough. Use [`JointAngles::get`] to read an
/// angle as an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngles {
    pub left_elbow: f32,
    pub right_elbow: f32,
    pub left_knee: f32,
    pub right_knee: f32,
    pub left_shoulder: f32,
    pub right_shoulder: f32,
    pub left_hip: f32,
    pub right_hip: f32,
}

impl JointAngles {
    /// Raw angle value, including the `0.0` sentinel
    pub fn value(&self, joint: Joint) -> f32 {
        match joint {
            Joint::LeftElbow => self.left_elbow,
            Joint::RightElbow => self.right_elbow,
            Joint::LeftKnee => self.left_knee,
            Joint::RightKnee => self.right_knee,
            Joint::LeftShoulder => self.left_shoulder,
            Joint::RightShoulder => self.right_shoulder,
            Joint::LeftHip => self.left_hip,
            Joint::RightHip => self.right_hip,
        }
    }

    /// Angle for a joint, `None` when it was not computable
    pub fn get(&self, joint: Joint) -> Option<f32> {
        let value = self.value(joint);
        (value != 0.0).then_some(value)
    }

    /// Average of the available sides of a left/right pair
    pub fn bilateral_mean(&self, left: Joint, right: Joint) -> Option<f32> {
        match (self.get(left), self.get(right)) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }

    pub fn knee(&self) -> Option<f32> {
        self.bilateral_mean(Joint::LeftKnee, Joint::RightKnee)
    }

    pub fn hip(&self) -> Option<f32> {
        self.bilateral_mean(Joint::LeftHip, Joint::RightHip)
    }

    pub fn elbow(&self) -> Option<f32> {
        self.bilateral_mean(Joint::LeftElbow, Joint::RightElbow)
    }
}
