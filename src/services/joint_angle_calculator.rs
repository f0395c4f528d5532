/// Joint Angle Calculator
///
/// Computes anatomical joint angles from landmark triples:
/// - elbow: shoulder, elbow, wrist
/// - knee: hip, knee, ankle
/// - shoulder: elbow, shoulder, hip
/// - hip: shoulder, hip, knee
///
/// The shoulder and hip triples are not mirror images of each other. This is
/// the established convention for stored angle data and must not be changed.

use crate::models::joint_angles::{Joint, JointAngles};
use crate::models::landmark::{Landmark, Pose, PoseLandmark, POSE_LANDMARK_COUNT};

/// Default visibility a landmark must exceed to contribute to an angle
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

/// Angle at vertex `b` between `b→a` and `b→c`, in degrees.
///
/// Returns 0 when either vector has zero length.
pub fn angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let ba = (a.x - b.x, a.y - b.y, a.z - b.z);
    let bc = (c.x - b.x, c.y - b.y, c.z - b.z);

    let dot = ba.0 * bc.0 + ba.1 * bc.1 + ba.2 * bc.2;
    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1 + ba.2 * ba.2).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1 + bc.2 * bc.2).sqrt();

    if mag_ba == 0.0 || mag_bc == 0.0 {
        return 0.0;
    }

    let cos_angle = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    let degrees = cos_angle.acos().to_degrees();

    if degrees.is_finite() {
        degrees
    } else {
        0.0
    }
}

/// Compute all joint angles with the default visibility threshold.
///
/// Returns `None` for poses with fewer than 33 landmarks.
pub fn joint_angles(pose: &Pose) -> Option<JointAngles> {
    JointAngleCalculator::new().calculate(pose)
}

/// Landmark triple (point a, vertex, point c) for a joint
pub fn joint_triple(joint: Joint) -> (PoseLandmark, PoseLandmark, PoseLandmark) {
    use PoseLandmark::*;

    match joint {
        Joint::LeftElbow => (LeftShoulder, LeftElbow, LeftWrist),
        Joint::RightElbow => (RightShoulder, RightElbow, RightWrist),
        Joint::LeftKnee => (LeftHip, LeftKnee, LeftAnkle),
        Joint::RightKnee => (RightHip, RightKnee, RightAnkle),
        Joint::LeftShoulder => (LeftElbow, LeftShoulder, LeftHip),
        Joint::RightShoulder => (RightElbow, RightShoulder, RightHip),
        Joint::LeftHip => (LeftShoulder, LeftHip, LeftKnee),
        Joint::RightHip => (RightShoulder, RightHip, RightKnee),
    }
}

/// Joint angle calculator with a configurable visibility threshold
#[derive(Debug, Clone, Copy)]
pub struct JointAngleCalculator {
    min_visibility: f32,
}

impl JointAngleCalculator {
    pub fn new() -> Self {
        Self {
            min_visibility: DEFAULT_MIN_VISIBILITY,
        }
    }

    /// Set minimum visibility threshold
    pub fn with_min_visibility(mut self, min_visibility: f32) -> Self {
        self.min_visibility = min_visibility.clamp(0.0, 1.0);
        self
    }

    pub fn min_visibility(&self) -> f32 {
        self.min_visibility
    }

    /// Angle for one joint, 0 when any contributing landmark is not visible
    fn joint_angle(&self, landmarks: &[Landmark], joint: Joint) -> f32 {
        let (a, b, c) = joint_triple(joint);
        let (a, b, c) = (
            &landmarks[a.index()],
            &landmarks[b.index()],
            &landmarks[c.index()],
        );

        if [a, b, c].iter().all(|lm| lm.is_visible(self.min_visibility)) {
            angle(a, b, c)
        } else {
            0.0
        }
    }

    /// Calculate all joint angles for a pose
    pub fn calculate(&self, pose: &Pose) -> Option<JointAngles> {
        if pose.len() < POSE_LANDMARK_COUNT {
            return None;
        }

        let landmarks = pose.landmarks();
        Some(JointAngles {
            left_elbow: self.joint_angle(landmarks, Joint::LeftElbow),
            right_elbow: self.joint_angle(landmarks, Joint::RightElbow),
            left_knee: self.joint_angle(landmarks, Joint::LeftKnee),
            right_knee: self.joint_angle(landmarks, Joint::RightKnee),
            left_shoulder: self.joint_angle(landmarks, Joint::LeftShoulder),
            right_shoulder: self.joint_angle(landmarks, Joint::RightShoulder),
            left_hip: self.joint_angle(landmarks, Joint::LeftHip),
            right_hip: self.joint_angle(landmarks, Joint::RightHip),
        })
    }
}

impl Default for JointAngleCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    /// Standing figure with arms hanging and legs straight
    fn create_test_pose() -> Pose {
        let mut landmarks = vec![lm(0.5, 0.1); POSE_LANDMARK_COUNT];
        landmarks[PoseLandmark::LeftShoulder.index()] = lm(0.45, 0.3);
        landmarks[PoseLandmark::RightShoulder.index()] = lm(0.55, 0.3);
        landmarks[PoseLandmark::LeftElbow.index()] = lm(0.45, 0.45);
        landmarks[PoseLandmark::RightElbow.index()] = lm(0.55, 0.45);
        // Forearms bent forward 90 degrees
        landmarks[PoseLandmark::LeftWrist.index()] = lm(0.35, 0.45);
        landmarks[PoseLandmark::RightWrist.index()] = lm(0.65, 0.45);
        landmarks[PoseLandmark::LeftHip.index()] = lm(0.45, 0.6);
        landmarks[PoseLandmark::RightHip.index()] = lm(0.55, 0.6);
        landmarks[PoseLandmark::LeftKnee.index()] = lm(0.45, 0.75);
        landmarks[PoseLandmark::RightKnee.index()] = lm(0.55, 0.75);
        landmarks[PoseLandmark::LeftAnkle.index()] = lm(0.45, 0.9);
        landmarks[PoseLandmark::RightAnkle.index()] = lm(0.55, 0.9);
        Pose::new(landmarks)
    }

    #[test]
    fn test_right_angle() {
        let deg = angle(&lm(0.0, 0.0), &lm(0.0, 1.0), &lm(1.0, 1.0));
        assert!((deg - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_straight_line() {
        let deg = angle(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(1.0, 0.0));
        assert!((deg - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_angle_uses_depth() {
        let a = Landmark::new(1.0, 0.0, 0.0, 1.0);
        let b = Landmark::new(0.0, 0.0, 0.0, 1.0);
        let c = Landmark::new(0.0, 0.0, 1.0, 1.0);
        assert!((angle(&a, &b, &c) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_vectors_return_zero() {
        let p = lm(0.3, 0.3);
        assert_eq!(angle(&p, &p, &lm(0.9, 0.1)), 0.0);
        assert_eq!(angle(&lm(0.9, 0.1), &p, &p), 0.0);
        assert_eq!(angle(&p, &p, &p), 0.0);
    }

    #[test]
    fn test_standing_pose_angles() {
        let angles = joint_angles(&create_test_pose()).unwrap();

        assert!((angles.left_knee - 180.0).abs() < 0.01);
        assert!((angles.right_knee - 180.0).abs() < 0.01);
        assert!((angles.left_hip - 180.0).abs() < 0.01);
        assert!((angles.left_elbow - 90.0).abs() < 0.01);
        assert!((angles.right_elbow - 90.0).abs() < 0.01);
        // Upper arm hangs along the torso
        assert!(angles.left_shoulder.abs() < 0.01);
    }

    #[test]
    fn test_short_pose_returns_none() {
        let pose = Pose::new(vec![lm(0.5, 0.5); POSE_LANDMARK_COUNT - 1]);
        assert!(joint_angles(&pose).is_none());
        assert!(joint_angles(&Pose::new(Vec::new())).is_none());
    }

    #[test]
    fn test_invisible_landmarks_produce_sentinel() {
        let landmarks = create_test_pose()
            .into_landmarks()
            .into_iter()
            .map(|l| Landmark { visibility: 0.0, ..l })
            .collect();

        let angles = joint_angles(&Pose::new(landmarks)).unwrap();
        assert_eq!(angles, JointAngles::default());
    }

    #[test]
    fn test_single_hidden_landmark_only_affects_its_joints() {
        let mut landmarks = create_test_pose().into_landmarks();
        landmarks[PoseLandmark::LeftAnkle.index()].visibility = 0.5;

        let angles = joint_angles(&Pose::new(landmarks)).unwrap();
        assert_eq!(angles.left_knee, 0.0);
        assert!(angles.right_knee > 0.0);
        assert!(angles.left_hip > 0.0);
    }

    #[test]
    fn test_custom_threshold() {
        let mut landmarks = create_test_pose().into_landmarks();
        for l in landmarks.iter_mut() {
            l.visibility = 0.4;
        }
        let pose = Pose::new(landmarks);

        let strict = JointAngleCalculator::new().calculate(&pose).unwrap();
        assert_eq!(strict.left_knee, 0.0);

        let lenient = JointAngleCalculator::new()
            .with_min_visibility(0.3)
            .calculate(&pose)
            .unwrap();
        assert!(lenient.left_knee > 0.0);
    }
}
