use std::io::Cursor;

use egui::{Color32, Pos2, Vec2};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{SurfaceError, SurfaceResult};
use crate::snapshot::EncodedImage;
use crate::stroke::StrokeSegment;
use crate::tools::LineCap;

/// Default canvas width in pixels
pub const CANVAS_WIDTH: u32 = 1024;
/// Default canvas height in pixels
pub const CANVAS_HEIGHT: u32 = 1024;

/// The capabilities the editing core needs from a drawing target.
///
/// Implemented headlessly by [`RasterSurface`]; a host canvas can implement it
/// to render straight to screen.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Read one pixel, `None` when out of bounds
    fn pixel(&self, x: u32, y: u32) -> Option<Color32>;

    /// Stroke a single line segment with the segment's style
    fn draw_segment(&mut self, segment: &StrokeSegment);

    /// Overwrite every pixel with `color`
    fn fill(&mut self, color: Color32);

    /// Serialize the current content losslessly
    fn encode(&self) -> SurfaceResult<EncodedImage>;

    /// Replace the whole content with a previously encoded snapshot
    fn decode_into(&mut self, snapshot: &EncodedImage) -> SurfaceResult<()>;
}

/// In-memory RGBA pixel buffer
#[derive(Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Create a surface filled with `background`
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, to_rgba(background)),
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Number of pixels exactly matching `color`
    pub fn count_pixels(&self, color: Color32) -> usize {
        let target = to_rgba(color);
        self.pixels.pixels().filter(|p| **p == target).count()
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        self.pixels.get_pixel_checked(x, y).map(|p| {
            let [r, g, b, a] = p.0;
            Color32::from_rgba_premultiplied(r, g, b, a)
        })
    }

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        let style = segment.style;
        let radius = style.half_width();
        if radius <= 0.0 {
            return;
        }

        // Square caps stick out diagonally past the end points
        let reach = match style.line_cap {
            LineCap::Round => radius,
            LineCap::Square => radius * std::f32::consts::SQRT_2,
        };
        let (from, to) = (segment.from, segment.to);

        // Float to int casts saturate, so off-canvas bounds clamp to the edges
        let min_x = (from.x.min(to.x) - reach).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0) as u32;
        let max_x = ((from.x.max(to.x) + reach).ceil() as u32).min(self.width());
        let max_y = ((from.y.max(to.y) + reach).ceil() as u32).min(self.height());

        let color = to_rgba(style.stroke_color);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if covers(center, from, to, radius, style.line_cap) {
                    self.pixels.put_pixel(x, y, color);
                }
            }
        }
    }

    fn fill(&mut self, color: Color32) {
        let color = to_rgba(color);
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    fn encode(&self) -> SurfaceResult<EncodedImage> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(EncodedImage::png(bytes))
    }

    fn decode_into(&mut self, snapshot: &EncodedImage) -> SurfaceResult<()> {
        let decoded = snapshot.decode()?;
        if decoded.dimensions() != self.pixels.dimensions() {
            return Err(SurfaceError::DimensionMismatch {
                expected_width: self.pixels.width(),
                expected_height: self.pixels.height(),
                found_width: decoded.width(),
                found_height: decoded.height(),
            });
        }
        self.pixels = decoded;
        Ok(())
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_array())
}

/// Whether the pixel centered at `p` lies inside the thick segment `a`-`b`
fn covers(p: Pos2, a: Pos2, b: Pos2, radius: f32, cap: LineCap) -> bool {
    let ab: Vec2 = b - a;
    let len_sq = ab.length_sq();

    if len_sq <= f32::EPSILON {
        // A dot: single press without movement
        return match cap {
            LineCap::Round => (p - a).length_sq() <= radius * radius,
            LineCap::Square => (p.x - a.x).abs() <= radius && (p.y - a.y).abs() <= radius,
        };
    }

    let len = len_sq.sqrt();
    let dir = ab / len;
    let ap = p - a;
    let along = ap.dot(dir);

    match cap {
        LineCap::Round => {
            let closest = a + dir * along.clamp(0.0, len);
            (p - closest).length_sq() <= radius * radius
        }
        LineCap::Square => {
            let across = (ap.x * dir.y - ap.y * dir.x).abs();
            along >= -radius && along <= len + radius && across <= radius
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{BACKGROUND_COLOR, DRAW_COLOR, Tool};

    fn segment(from: Pos2, to: Pos2, tool: Tool) -> StrokeSegment {
        StrokeSegment {
            from,
            to,
            style: tool.style(),
        }
    }

    #[test]
    fn test_new_surface_is_background() {
        let surface = RasterSurface::new(16, 8, BACKGROUND_COLOR);
        assert_eq!(surface.width(), 16);
        assert_eq!(surface.height(), 8);
        assert_eq!(surface.count_pixels(BACKGROUND_COLOR), 16 * 8);
        assert_eq!(surface.pixel(16, 0), None);
    }

    #[test]
    fn test_pencil_segment_covers_line() {
        let mut surface = RasterSurface::new(32, 32, BACKGROUND_COLOR);
        surface.draw_segment(&segment(Pos2::new(4.0, 10.0), Pos2::new(28.0, 10.0), Tool::Pencil));

        for x in 4..28 {
            assert_eq!(surface.pixel(x, 10), Some(DRAW_COLOR), "x = {x}");
        }
        // Well away from the line nothing changed
        assert_eq!(surface.pixel(16, 20), Some(BACKGROUND_COLOR));
        assert_eq!(surface.pixel(16, 2), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_round_cap_does_not_extend_square() {
        let mut surface = RasterSurface::new(32, 32, BACKGROUND_COLOR);
        surface.draw_segment(&segment(Pos2::new(10.0, 10.0), Pos2::new(20.0, 10.0), Tool::Pencil));
        // The corner diagonal to the end point stays outside a round cap
        assert_eq!(surface.pixel(21, 11), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_square_cap_fills_corners() {
        let mut surface = RasterSurface::new(64, 64, DRAW_COLOR);
        surface.draw_segment(&segment(Pos2::new(30.0, 30.0), Pos2::new(34.0, 30.0), Tool::Eraser));
        // Eraser half width is 12, so the box spans 18..46 horizontally, 18..42 vertically
        assert_eq!(surface.pixel(18, 18), Some(BACKGROUND_COLOR));
        assert_eq!(surface.pixel(45, 41), Some(BACKGROUND_COLOR));
        assert_eq!(surface.pixel(17, 30), Some(DRAW_COLOR));
        assert_eq!(surface.pixel(30, 43), Some(DRAW_COLOR));
    }

    #[test]
    fn test_single_point_draws_dot() {
        let mut surface = RasterSurface::new(16, 16, BACKGROUND_COLOR);
        let p = Pos2::new(8.0, 8.0);
        surface.draw_segment(&segment(p, p, Tool::Pencil));
        assert_eq!(surface.pixel(8, 8), Some(DRAW_COLOR));
        assert_eq!(surface.pixel(7, 7), Some(DRAW_COLOR));
        assert_eq!(surface.pixel(12, 8), Some(BACKGROUND_COLOR));
    }

    #[test]
    fn test_off_canvas_segment_is_clipped() {
        let mut surface = RasterSurface::new(16, 16, BACKGROUND_COLOR);
        surface.draw_segment(&segment(Pos2::new(-40.0, -40.0), Pos2::new(-20.0, -5.0), Tool::Eraser));
        surface.draw_segment(&segment(Pos2::new(-10.0, 8.0), Pos2::new(100.0, 8.0), Tool::Pencil));
        assert_eq!(surface.pixel(0, 8), Some(DRAW_COLOR));
        assert_eq!(surface.pixel(15, 8), Some(DRAW_COLOR));
    }

    #[test]
    fn test_encode_decode_is_lossless() {
        let mut surface = RasterSurface::new(24, 24, BACKGROUND_COLOR);
        surface.draw_segment(&segment(Pos2::new(2.0, 2.0), Pos2::new(20.0, 17.0), Tool::Pencil));
        let snapshot = surface.encode().unwrap();
        assert_eq!(snapshot.content_type(), "image/png");

        let mut restored = RasterSurface::new(24, 24, BACKGROUND_COLOR);
        restored.decode_into(&snapshot).unwrap();
        assert_eq!(restored.as_image(), surface.as_image());
    }

    #[test]
    fn test_decode_rejects_other_dimensions() {
        let snapshot = RasterSurface::new(8, 8, BACKGROUND_COLOR).encode().unwrap();
        let mut surface = RasterSurface::new(16, 16, BACKGROUND_COLOR);
        let result = surface.decode_into(&snapshot);
        assert!(matches!(result, Err(SurfaceError::DimensionMismatch { .. })));
        assert_eq!(surface.count_pixels(BACKGROUND_COLOR), 16 * 16);
    }
}
