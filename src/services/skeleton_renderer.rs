/// Skeleton Renderer
///
/// Draws landmarks and bones onto a 2D surface.
///
/// Landmarks arrive normalized to [0, 1]. They are scaled to pixels using the
/// surface's current width and height on every draw call, so the renderer
/// never assumes a resolution and never caches scaling across resizes.
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::models::discipline::Discipline;
use crate::models::landmark::{Pose, POSE_CONNECTIONS};

/// Colors used by default
pub mod colors {
    use image::Rgba;

    /// Skeleton lines
    pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    /// Landmark dots
    pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    /// Discipline key joints
    pub const YELLOW: Rgba<u8> = Rgba([255, 215, 0, 255]);
    pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
}

/// A surface the skeleton can be drawn onto, in pixel coordinates
pub trait DrawingSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Reset the whole surface
    fn clear(&mut self);
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, width: f32);
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>);
}

/// Drawing options
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub line_color: Rgba<u8>,
    pub line_width: f32,
    pub point_color: Rgba<u8>,
    pub point_radius: f32,
    /// Landmarks at or below this visibility are not drawn
    pub min_visibility: f32,
    /// Clear the surface before drawing. Disable to bake the overlay into
    /// an existing frame.
    pub clear_first: bool,
    /// Highlights this discipline's key joints
    pub discipline: Option<Discipline>,
    pub highlight_color: Rgba<u8>,
    pub highlight_radius: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_color: colors::GREEN,
            line_width: 2.0,
            point_color: colors::RED,
            point_radius: 4.0,
            min_visibility: 0.5,
            clear_first: true,
            discipline: None,
            highlight_color: colors::YELLOW,
            highlight_radius: 7.0,
        }
    }
}

impl RenderOptions {
    /// Options for permanently annotating a frame image
    pub fn baked(discipline: Discipline) -> Self {
        Self {
            clear_first: false,
            discipline: Some(discipline),
            ..Default::default()
        }
    }
}

/// What a draw call produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub lines: usize,
    pub points: usize,
    pub highlighted_points: usize,
}

/// Draw the pose skeleton onto `surface`
pub fn draw_skeleton<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    pose: &Pose,
    options: &RenderOptions,
) -> RenderStats {
    if options.clear_first {
        surface.clear();
    }

    let width = surface.width() as f32;
    let height = surface.height() as f32;
    let landmarks = pose.landmarks();
    let visible = |idx: usize| {
        landmarks
            .get(idx)
            .is_some_and(|lm| lm.is_visible(options.min_visibility))
    };

    let mut stats = RenderStats::default();

    for &(start_idx, end_idx) in POSE_CONNECTIONS.iter() {
        if !(visible(start_idx) && visible(end_idx)) {
            continue;
        }
        let from = landmarks[start_idx].to_pixel(width, height);
        let to = landmarks[end_idx].to_pixel(width, height);
        surface.draw_line(from, to, options.line_color, options.line_width);
        stats.lines += 1;
    }

    for (idx, lm) in landmarks.iter().enumerate() {
        if !lm.is_visible(options.min_visibility) {
            continue;
        }

        let highlighted = options
            .discipline
            .is_some_and(|discipline| discipline.is_key_joint(idx));
        let (color, radius) = if highlighted {
            (options.highlight_color, options.highlight_radius)
        } else {
            (options.point_color, options.point_radius)
        };

        surface.fill_circle(lm.to_pixel(width, height), radius, color);
        stats.points += 1;
        if highlighted {
            stats.highlighted_points += 1;
        }
    }

    stats
}

impl DrawingSurface for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn clear(&mut self) {
        for pixel in self.pixels_mut() {
            *pixel = colors::TRANSPARENT;
        }
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgba<u8>, width: f32) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length = (dx * dx + dy * dy).sqrt();

        if width <= 1.0 || length < 1.0 {
            draw_line_segment_mut(self, from, to, color);
            return;
        }

        // Thick lines are filled quads around the segment
        let (nx, ny) = (-dy / length * width / 2.0, dx / length * width / 2.0);
        let corners = [
            (from.0 + nx, from.1 + ny),
            (to.0 + nx, to.1 + ny),
            (to.0 - nx, to.1 - ny),
            (from.0 - nx, from.1 - ny),
        ];
        let mut polygon: Vec<Point<i32>> = corners
            .iter()
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
            .collect();
        polygon.dedup();
        if polygon.len() < 3 || polygon.first() == polygon.last() {
            draw_line_segment_mut(self, from, to, color);
            return;
        }
        draw_polygon_mut(self, &polygon, color);
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        let center = (center.0.round() as i32, center.1.round() as i32);
        draw_filled_circle_mut(self, center, radius.round().max(1.0) as i32, color);
    }
}
