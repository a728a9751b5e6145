// src/canvas.rs - Render commands and a bitmap rasterizer for them
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops, ImageFormat, Pixel, Rgba, RgbaImage};

use crate::config::BrushConfig;
use crate::error::ConfigError;
use crate::geometry::{self, CanvasPoint};
use crate::stroke::StrokeSegment;
use crate::tracking::{landmarks, HAND_CONNECTIONS};

/// What one processed frame asks the rasterizer to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Wipe the transient layer (cursor, skeleton) before redrawing it.
    ClearOverlay,
    DrawHand { points: Vec<CanvasPoint> },
    DrawCursor { position: CanvasPoint, pinching: bool },
    /// Permanent ink on the drawing layer.
    Segment(StrokeSegment),
}

/// The rasterizer collaborator. Coordinates are canvas pixels and may fall
/// outside the canvas; clipping is the implementation's job.
pub trait Canvas {
    fn draw_segment(&mut self, segment: &StrokeSegment);
    fn clear_overlay(&mut self);
    fn draw_hand(&mut self, points: &[CanvasPoint]);
    fn draw_cursor(&mut self, position: CanvasPoint, pinching: bool);
    fn clear_drawing(&mut self);

    fn execute(&mut self, commands: &[RenderCommand]) {
        for command in commands {
            match command {
                RenderCommand::ClearOverlay => self.clear_overlay(),
                RenderCommand::DrawHand { points } => self.draw_hand(points),
                RenderCommand::DrawCursor { position, pinching } => self.draw_cursor(*position, *pinching),
                RenderCommand::Segment(segment) => self.draw_segment(segment),
            }
        }
    }
}

const SKELETON_COLOR: Rgba<u8> = Rgba([102, 126, 234, 153]);
const JOINT_COLOR: Rgba<u8> = Rgba([102, 126, 234, 255]);
const TIP_COLOR: Rgba<u8> = Rgba([240, 147, 251, 255]);
const JOINT_RADIUS: f64 = 4.0;
const SKELETON_WIDTH: f64 = 2.0;
const CURSOR_RING_WIDTH: f64 = 3.0;
const MIN_SEGMENT_LENGTH: f64 = 1.0;

/// Two-layer RGBA canvas: permanent ink below, per-frame overlay above.
pub struct RasterCanvas {
    drawing: RgbaImage,
    overlay: RgbaImage,
    brush_size: f32,
    min_size: f32,
    max_size: f32,
    brush_color: Rgba<u8>,
    cursor_color: Rgba<u8>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, brush: &BrushConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            drawing: RgbaImage::new(width, height),
            overlay: RgbaImage::new(width, height),
            brush_size: brush.size.clamp(brush.min_size, brush.max_size),
            min_size: brush.min_size,
            max_size: brush.max_size,
            brush_color: parse_hex_color(&brush.color)?,
            cursor_color: parse_hex_color(&brush.cursor_color)?,
        })
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = size.clamp(self.min_size, self.max_size);
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn set_brush_color(&mut self, color: Rgba<u8>) {
        self.brush_color = color;
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.drawing.dimensions()
    }

    pub fn drawing(&self) -> &RgbaImage {
        &self.drawing
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    /// Overlay blended onto the ink, as a viewer would see the frame.
    pub fn composite(&self) -> RgbaImage {
        let mut frame = self.drawing.clone();
        imageops::overlay(&mut frame, &self.overlay, 0, 0);
        frame
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.drawing
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn save_preview_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.composite()
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl Canvas for RasterCanvas {
    fn draw_segment(&mut self, segment: &StrokeSegment) {
        if segment.length() < MIN_SEGMENT_LENGTH {
            return;
        }
        let radius = self.brush_size as f64 / 2.0;
        let (width, height) = self.drawing.dimensions();
        // The curve never leaves the straight line between the endpoints, so only the
        // part within a brush radius of the canvas can leave ink.
        let Some((from, to)) = clip_segment(
            &segment.from,
            &segment.to,
            &CanvasPoint::new(-radius, -radius),
            &CanvasPoint::new(width as f64 + radius, height as f64 + radius),
        ) else {
            return;
        };
        let visible = StrokeSegment { from, to, ..*segment };

        let spacing = (radius / 2.0).max(0.5);
        let samples = (visible.length() / spacing).ceil().max(2.0) as usize;
        let color = self.brush_color;
        for center in visible.curve(samples) {
            stamp_disc(&mut self.drawing, &center, radius, color);
        }
    }

    fn clear_overlay(&mut self) {
        clear(&mut self.overlay);
    }

    fn draw_hand(&mut self, points: &[CanvasPoint]) {
        for &(start, end) in HAND_CONNECTIONS.iter() {
            if let (Some(a), Some(b)) = (points.get(start), points.get(end)) {
                stamp_line(&mut self.overlay, a, b, SKELETON_WIDTH / 2.0, SKELETON_COLOR);
            }
        }
        for (index, point) in points.iter().enumerate() {
            let color = if index == landmarks::THUMB_TIP || index == landmarks::INDEX_TIP {
                TIP_COLOR
            } else {
                JOINT_COLOR
            };
            stamp_disc(&mut self.overlay, point, JOINT_RADIUS, color);
        }
    }

    fn draw_cursor(&mut self, position: CanvasPoint, pinching: bool) {
        let brush = self.brush_size as f64;
        let radius = if pinching { brush + 5.0 } else { brush + 10.0 };
        if pinching {
            let mut fill = self.brush_color;
            fill.0[3] = 0x40;
            stamp_disc(&mut self.overlay, &position, radius, fill);
        }
        let ring = if pinching { self.brush_color } else { self.cursor_color };
        stamp_ring(&mut self.overlay, &position, radius, CURSOR_RING_WIDTH, ring);
    }

    fn clear_drawing(&mut self) {
        clear(&mut self.drawing);
    }
}

/// Parse `#rrggbb` into an opaque colour.
pub fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ConfigError> {
    let digits = hex
        .strip_prefix('#')
        .filter(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| ConfigError::Color(hex.to_string()))?;
    let value = u32::from_str_radix(digits, 16).map_err(|_| ConfigError::Color(hex.to_string()))?;
    Ok(Rgba([(value >> 16) as u8, (value >> 8) as u8, value as u8, 255]))
}

fn clear(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

/// Liang-Barsky clip of `a -> b` against the box `min..max`. `None` when nothing is inside.
fn clip_segment(
    a: &CanvasPoint,
    b: &CanvasPoint,
    min: &CanvasPoint,
    max: &CanvasPoint,
) -> Option<(CanvasPoint, CanvasPoint)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Pixel indices covering `lo..=hi`, limited to `0..limit`.
fn pixel_span(lo: f64, hi: f64, limit: u32) -> RangeInclusive<i64> {
    (lo.floor() as i64).max(0)..=(hi.ceil() as i64).min(limit as i64 - 1)
}

fn blend_at(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
        return;
    }
    image.get_pixel_mut(x as u32, y as u32).blend(&color);
}

/// Filled disc; pixels whose centre lies within `radius` are painted.
fn stamp_disc(image: &mut RgbaImage, center: &CanvasPoint, radius: f64, color: Rgba<u8>) {
    let radius = radius.max(0.5);
    let (width, height) = image.dimensions();
    for y in pixel_span(center.y - radius, center.y + radius, height) {
        for x in pixel_span(center.x - radius, center.x + radius, width) {
            let pixel_center = CanvasPoint::new(x as f64 + 0.5, y as f64 + 0.5);
            if geometry::distance_2d(&pixel_center, center) <= radius {
                blend_at(image, x, y, color);
            }
        }
    }
}

fn stamp_ring(image: &mut RgbaImage, center: &CanvasPoint, radius: f64, width: f64, color: Rgba<u8>) {
    let outer = radius + width / 2.0;
    let inner = (radius - width / 2.0).max(0.0);
    let (width, height) = image.dimensions();
    for y in pixel_span(center.y - outer, center.y + outer, height) {
        for x in pixel_span(center.x - outer, center.x + outer, width) {
            let d = geometry::distance_2d(&CanvasPoint::new(x as f64 + 0.5, y as f64 + 0.5), center);
            if d >= inner && d <= outer {
                blend_at(image, x, y, color);
            }
        }
    }
}

/// Straight round-capped line, each pixel painted once so translucent colours stay even.
fn stamp_line(image: &mut RgbaImage, a: &CanvasPoint, b: &CanvasPoint, radius: f64, color: Rgba<u8>) {
    let radius = radius.max(0.5);
    let (width, height) = image.dimensions();
    let ab = b - a;
    let len_sq = ab.norm_squared();
    for y in pixel_span(a.y.min(b.y) - radius, a.y.max(b.y) + radius, height) {
        for x in pixel_span(a.x.min(b.x) - radius, a.x.max(b.x) + radius, width) {
            let p = CanvasPoint::new(x as f64 + 0.5, y as f64 + 0.5);
            let t = if len_sq > 0.0 { ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
            let closest = a + ab * t;
            if geometry::distance_2d(&p, &closest) <= radius {
                blend_at(image, x, y, color);
            }
        }
    }
}
