use thiserror::Error;

/// Errors raised while encoding, decoding or restoring raster content
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to encode or decode snapshot: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Snapshot is {found_width}x{found_height}, surface is {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        found_width: u32,
        found_height: u32,
    },
}

/// Result type for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// The prompt given to a submission failed a precondition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Prompt is {len} characters long, the limit is {max}")]
    PromptTooLong { len: usize, max: usize },
}

/// The image-generation endpoint could not be reached or refused the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Endpoint answered with HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Request failed: {0}")]
    Connection(String),
}

/// Everything that can end a submission without a session log entry
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Endpoint returned a non-image payload ({content_type}): {detail}")]
    UnexpectedResponse { content_type: String, detail: String },

    #[error("Failed to serialize the sketch: {0}")]
    Snapshot(#[from] SurfaceError),
}

/// Errors that can occur while loading a session configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
