use egui::Color32;
use serde::{Deserialize, Serialize};

/// Color a cleared canvas is filled with; the eraser paints with it too
pub const BACKGROUND_COLOR: Color32 = Color32::WHITE;

/// Color the pencil draws with
pub const DRAW_COLOR: Color32 = Color32::BLACK;

/// Pencil line width in pixels
pub const PENCIL_WIDTH: f32 = 3.0;

/// Eraser line width in pixels, deliberately much broader than the pencil
pub const ERASER_WIDTH: f32 = 24.0;

/// How the ends of a stroke segment are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    /// Half-disc on each end, so consecutive segments join smoothly
    Round,
    /// Segment extended by half the line width on each end
    Square,
}

/// Rendering parameters of a tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolStyle {
    pub stroke_color: Color32,
    pub line_width: f32,
    pub line_cap: LineCap,
}

impl ToolStyle {
    pub fn half_width(&self) -> f32 {
        self.line_width * 0.5
    }
}

/// The drawing tools available on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
        }
    }

    /// The fixed style each tool draws with
    pub fn style(&self) -> ToolStyle {
        match self {
            Tool::Pencil => ToolStyle {
                stroke_color: DRAW_COLOR,
                line_width: PENCIL_WIDTH,
                line_cap: LineCap::Round,
            },
            Tool::Eraser => ToolStyle {
                stroke_color: BACKGROUND_COLOR,
                line_width: ERASER_WIDTH,
                line_cap: LineCap::Square,
            },
        }
    }
}

/// Tracks which tool is active for the editing session
#[derive(Debug, Clone, Default)]
pub struct ToolState {
    active: Tool,
}

impl ToolState {
    pub fn new(initial: Tool) -> Self {
        Self { active: initial }
    }

    /// Switch the active tool.
    ///
    /// Segments that were already drawn keep the style they were drawn with;
    /// a gesture in progress simply continues with the new style.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.active != tool {
            log::debug!("Tool changed: {} -> {}", self.active.name(), tool.name());
            self.active = tool;
        }
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    /// Style of the active tool, re-read by the renderer for every segment
    pub fn style(&self) -> ToolStyle {
        self.active.style()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_is_pencil() {
        let tools = ToolState::default();
        assert_eq!(tools.active(), Tool::Pencil);
        assert_eq!(tools.style().stroke_color, DRAW_COLOR);
        assert_eq!(tools.style().line_cap, LineCap::Round);
    }

    #[test]
    fn test_tool_selection() {
        let mut tools = ToolState::new(Tool::Pencil);
        tools.set_tool(Tool::Eraser);
        assert_eq!(tools.active(), Tool::Eraser);
        assert_eq!(tools.style().stroke_color, BACKGROUND_COLOR);
    }

    #[test]
    fn test_eraser_is_wider_than_pencil() {
        assert!(Tool::Eraser.style().line_width > Tool::Pencil.style().line_width);
    }
}
