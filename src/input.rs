use egui::Pos2;

/// Pointer input delivered by the host, already in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button went down
    Down { position: Pos2 },
    /// Pointer moved, with or without the button held
    Move { position: Pos2 },
    /// Primary button was released
    Up { position: Pos2 },
    /// Pointer left the canvas
    Leave,
}
