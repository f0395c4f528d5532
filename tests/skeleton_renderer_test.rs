/// Integration tests for skeleton rendering against a recording surface
mod common;

use common::pose_with_visible;
use image::Rgba;
use pose_coach::models::{Discipline, PoseLandmark};
use pose_coach::services::skeleton_renderer::colors;
use pose_coach::services::{draw_skeleton, DrawingSurface, RenderOptions};

#[derive(Debug, Default)]
struct RecordingSurface {
    width: u32,
    height: u32,
    clears: usize,
    lines: Vec<((f32, f32), (f32, f32))>,
    circles: Vec<((f32, f32), f32, Rgba<u8>)>,
}

impl RecordingSurface {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), _color: Rgba<u8>, _width: f32) {
        self.lines.push((from, to));
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        self.circles.push((center, radius, color));
    }
}

const FOOTBALL_JOINTS: [PoseLandmark; 6] = [
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::RightAnkle,
];

#[test]
fn test_football_key_joints_highlighted() {
    let pose = pose_with_visible(&FOOTBALL_JOINTS);
    let options = RenderOptions {
        discipline: Some(Discipline::Football),
        ..Default::default()
    };
    let mut surface = RecordingSurface::new(640, 480);

    let stats = draw_skeleton(&mut surface, &pose, &options);

    assert_eq!(surface.circles.len(), 6);
    assert!(surface
        .circles
        .iter()
        .all(|&(_, radius, color)| radius == options.highlight_radius && color == options.highlight_color));
    assert_eq!(stats.highlighted_points, 6);

    // Hips to each other, hips to knees, knees to ankles
    assert_eq!(surface.lines.len(), 5);
    let key_points: Vec<(f32, f32)> = FOOTBALL_JOINTS
        .iter()
        .map(|lm| pose.get(*lm).unwrap().to_pixel(640.0, 480.0))
        .collect();
    for (from, to) in &surface.lines {
        assert!(key_points.contains(from));
        assert!(key_points.contains(to));
    }
}

#[test]
fn test_without_discipline_uses_default_points() {
    let pose = pose_with_visible(&FOOTBALL_JOINTS);
    let mut surface = RecordingSurface::new(100, 100);

    let stats = draw_skeleton(&mut surface, &pose, &RenderOptions::default());

    assert_eq!(stats.highlighted_points, 0);
    assert!(surface
        .circles
        .iter()
        .all(|&(_, radius, color)| radius == 4.0 && color == colors::RED));
}

#[test]
fn test_unknown_discipline_highlights_nothing() {
    let pose = pose_with_visible(&PoseLandmark::ALL);
    let options = RenderOptions {
        discipline: Some(Discipline::parse("underwater-hockey")),
        ..Default::default()
    };
    let mut surface = RecordingSurface::new(100, 100);

    let stats = draw_skeleton(&mut surface, &pose, &options);

    assert_eq!(stats.points, 33);
    assert_eq!(stats.lines, 35);
    assert_eq!(stats.highlighted_points, 0);
}

#[test]
fn test_scaling_recomputed_per_draw() {
    let pose = pose_with_visible(&[PoseLandmark::Nose]);
    let nose = *pose.get(PoseLandmark::Nose).unwrap();

    let mut surface = RecordingSurface::new(200, 100);
    draw_skeleton(&mut surface, &pose, &RenderOptions::default());
    surface.width = 400;
    surface.height = 300;
    draw_skeleton(&mut surface, &pose, &RenderOptions::default());

    assert_eq!(surface.circles[0].0, (nose.x * 200.0, nose.y * 100.0));
    assert_eq!(surface.circles[1].0, (nose.x * 400.0, nose.y * 300.0));
}

#[test]
fn test_baked_options_draw_additively() {
    let pose = pose_with_visible(&FOOTBALL_JOINTS);
    let mut surface = RecordingSurface::new(64, 64);

    draw_skeleton(&mut surface, &pose, &RenderOptions::baked(Discipline::Football));
    assert_eq!(surface.clears, 0);

    draw_skeleton(&mut surface, &pose, &RenderOptions::default());
    assert_eq!(surface.clears, 1);
}
