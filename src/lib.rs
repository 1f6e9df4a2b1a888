#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod session_log;
pub mod snapshot;
pub mod state;
pub mod stroke;
pub mod submission;
pub mod surface;
pub mod tools;

pub use config::{EndpointConfig, SessionConfig};
pub use error::{ConfigError, SubmissionError, SurfaceError, TransportError, ValidationError};
pub use history::{HistoryBuffer, HistoryEntry};
pub use input::PointerEvent;
pub use session_log::{SessionLog, SubmissionRecord};
pub use snapshot::EncodedImage;
pub use state::SketchSession;
pub use stroke::{StrokeRenderer, StrokeSegment};
pub use submission::{
    GenerationRequest, GenerationResponse, HttpEndpoint, ImageEndpoint, SubmissionPipeline,
    SubmissionResult,
};
pub use surface::{RasterSurface, Surface};
pub use tools::{LineCap, Tool, ToolState, ToolStyle};
