use egui::{Color32, Pos2};

use crate::surface::Surface;
use crate::tools::ToolStyle;

/// One straight piece of a freehand stroke, drawn and then forgotten
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub from: Pos2,
    pub to: Pos2,
    pub style: ToolStyle,
}

/// The gesture currently being drawn
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    anchor: Pos2,
    segments: usize,
}

/// Turns pointer samples into line segments on the surface it owns
#[derive(Debug)]
pub struct StrokeRenderer<S: Surface> {
    surface: S,
    background: Color32,
    active: Option<ActiveStroke>,
}

impl<S: Surface> StrokeRenderer<S> {
    pub fn new(surface: S, background: Color32) -> Self {
        Self {
            surface,
            background,
            active: None,
        }
    }

    /// Begin a stroke at `point`, replacing any gesture still in progress
    pub fn start_stroke(&mut self, point: Pos2) {
        self.active = Some(ActiveStroke {
            anchor: point,
            segments: 0,
        });
    }

    /// Draw from the last recorded point to `point` and move the anchor there.
    ///
    /// Does nothing unless a stroke is in progress. The style is taken per
    /// segment, so a tool change mid-gesture only affects later segments.
    pub fn extend_stroke(&mut self, point: Pos2, style: ToolStyle) {
        let Some(stroke) = &mut self.active else {
            return;
        };

        let segment = StrokeSegment {
            from: stroke.anchor,
            to: point,
            style,
        };
        self.surface.draw_segment(&segment);

        stroke.anchor = point;
        stroke.segments += 1;
    }

    /// Leave drawing state, returning how many segments the gesture drew
    pub fn end_stroke(&mut self) -> usize {
        self.active.take().map_or(0, |stroke| stroke.segments)
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Reset every pixel to the background color.
    ///
    /// Ends any gesture in progress so it cannot keep drawing onto the
    /// cleared surface.
    pub fn clear(&mut self) {
        self.active = None;
        self.surface.fill(self.background);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
