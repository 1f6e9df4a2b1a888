//! The editing session: one canvas, its tools, its undo history and its
//! submission log, driven by the host's event loop.
//!
//! All mutation goes through `&mut SketchSession`, so pointer handling,
//! history moves and tool switches never interleave. The only asynchronous
//! part is the network call of a submission, which runs on data copied out of
//! the session when [`SketchSession::submit`] is called.
use std::sync::Arc;

use egui::Pos2;
use futures::future::BoxFuture;

use crate::config::SessionConfig;
use crate::error::SurfaceResult;
use crate::history::HistoryBuffer;
use crate::input::PointerEvent;
use crate::session_log::SessionLog;
use crate::stroke::StrokeRenderer;
use crate::submission::{ImageEndpoint, SubmissionPipeline, SubmissionResult};
use crate::surface::{RasterSurface, Surface};
use crate::tools::{BACKGROUND_COLOR, Tool, ToolState};

/// Explicit state of one editing session
#[derive(Debug)]
pub struct SketchSession<S: Surface = RasterSurface> {
    renderer: StrokeRenderer<S>,
    tools: ToolState,
    history: HistoryBuffer,
    pipeline: SubmissionPipeline,
}

impl SketchSession<RasterSurface> {
    /// Start a session on a blank in-memory canvas sized by `config`
    pub fn new(config: &SessionConfig, endpoint: Arc<dyn ImageEndpoint>) -> SurfaceResult<Self> {
        let surface = RasterSurface::new(config.canvas_width, config.canvas_height, BACKGROUND_COLOR);
        Self::with_surface(surface, config, endpoint)
    }
}

impl<S: Surface> SketchSession<S> {
    /// Start a session drawing onto `surface`.
    ///
    /// The surface is cleared and captured as the first history entry, so the
    /// first drawn stroke can be undone.
    pub fn with_surface(
        surface: S,
        config: &SessionConfig,
        endpoint: Arc<dyn ImageEndpoint>,
    ) -> SurfaceResult<Self> {
        let mut renderer = StrokeRenderer::new(surface, BACKGROUND_COLOR);
        renderer.clear();

        let mut session = Self {
            renderer,
            tools: ToolState::new(config.initial_tool),
            history: HistoryBuffer::new(config.history_capacity),
            pipeline: SubmissionPipeline::new(endpoint, SessionLog::new(), config.max_prompt_chars),
        };
        session.history.capture(session.renderer.surface())?;

        log::info!(
            "Sketch session started ({}x{}, {} undo steps)",
            session.renderer.surface().width(),
            session.renderer.surface().height(),
            session.history.capacity()
        );
        Ok(session)
    }

    /// Route one pointer event from the host
    pub fn handle_pointer(&mut self, event: PointerEvent) -> SurfaceResult<()> {
        match event {
            PointerEvent::Down { position } => self.start_stroke(position)?,
            PointerEvent::Move { position } => self.extend_stroke(position),
            PointerEvent::Up { .. } | PointerEvent::Leave => {
                self.end_stroke()?;
            }
        }
        Ok(())
    }

    /// Begin a stroke at `point`.
    ///
    /// A stroke still in progress (its release event got lost) is finished
    /// first, so what it drew ends up in history.
    pub fn start_stroke(&mut self, point: Pos2) -> SurfaceResult<()> {
        if self.renderer.is_drawing() {
            log::debug!("Stroke started while another was in progress");
            self.end_stroke()?;
        }
        self.renderer.start_stroke(point);
        Ok(())
    }

    /// Continue the current stroke with the active tool's style
    pub fn extend_stroke(&mut self, point: Pos2) {
        self.renderer.extend_stroke(point, self.tools.style());
    }

    /// Finish the stroke group, recording it in history if it drew anything.
    ///
    /// Returns whether a snapshot was captured.
    pub fn end_stroke(&mut self) -> SurfaceResult<bool> {
        let segments = self.renderer.end_stroke();
        if segments == 0 {
            return Ok(false);
        }
        log::debug!("Stroke finished with {} segments", segments);
        self.history.capture(self.renderer.surface())?;
        Ok(true)
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tools.set_tool(tool);
    }

    pub fn active_tool(&self) -> Tool {
        self.tools.active()
    }

    /// Wipe the canvas; the cleared state becomes a new undo step
    pub fn clear(&mut self) -> SurfaceResult<()> {
        self.renderer.clear();
        self.history.capture(self.renderer.surface())?;
        log::debug!("Canvas cleared");
        Ok(())
    }

    /// Record the current canvas as a history entry
    pub fn capture(&mut self) -> SurfaceResult<()> {
        self.history.capture(self.renderer.surface()).map(|_| ())
    }

    /// Go back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> SurfaceResult<bool> {
        // Nothing to restore, so a stroke in progress carries on untouched
        if !self.history.can_undo() {
            return Ok(false);
        }
        self.abandon_stroke();
        self.history.undo(self.renderer.surface_mut())
    }

    /// Go forward one snapshot. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> SurfaceResult<bool> {
        if !self.history.can_redo() {
            return Ok(false);
        }
        self.abandon_stroke();
        self.history.redo(self.renderer.surface_mut())
    }

    // A stroke must not keep drawing onto a surface that is being replaced
    fn abandon_stroke(&mut self) {
        if self.renderer.is_drawing() {
            let segments = self.renderer.end_stroke();
            log::debug!("Discarding in-progress stroke of {} segments", segments);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Send the current canvas and `prompt` to the image-generation endpoint.
    ///
    /// The canvas is serialized before this returns; drawing may continue while
    /// the returned future is pending. See [`SubmissionPipeline::submit`].
    pub fn submit(&self, prompt: &str) -> BoxFuture<'static, SubmissionResult> {
        self.pipeline.submit(prompt, self.renderer.surface())
    }

    pub fn is_drawing(&self) -> bool {
        self.renderer.is_drawing()
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn log(&self) -> &SessionLog {
        self.pipeline.log()
    }

    /// End the session, keeping only its submission log.
    ///
    /// Submissions still in flight keep their own handle and will append to
    /// the returned log when they complete.
    pub fn finish(self) -> SessionLog {
        log::info!(
            "Sketch session finished with {} submissions",
            self.pipeline.log().len()
        );
        self.pipeline.log().clone()
    }
}
