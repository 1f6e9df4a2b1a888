mod http;
mod multipart;

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{SubmissionError, TransportError, ValidationError};
use crate::session_log::{SessionLog, SubmissionRecord};
use crate::snapshot::EncodedImage;
use crate::surface::Surface;

pub use http::HttpEndpoint;
pub use multipart::MultipartForm;

/// Default prompt length limit, in characters
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 500;

/// Result of one submission round trip
pub type SubmissionResult = Result<Arc<SubmissionRecord>, SubmissionError>;

/// What gets sent to the image-generation endpoint
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub sketch: EncodedImage,
}

/// Raw answer of the image-generation endpoint
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub status: u16,
    /// Reason phrase that came with the status line
    pub reason: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl GenerationResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The external image-generation service.
///
/// An implementation returns `Ok` for every response it received, whatever the
/// status; `Err` is reserved for failing to get a response at all (connection
/// errors, timeouts).
pub trait ImageEndpoint: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'static, Result<GenerationResponse, TransportError>>;
}

/// Sends sketches to the endpoint and records successful results
#[derive(Clone)]
pub struct SubmissionPipeline {
    endpoint: Arc<dyn ImageEndpoint>,
    log: SessionLog,
    max_prompt_chars: usize,
}

impl std::fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPipeline")
            .field("log", &self.log)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish_non_exhaustive()
    }
}

impl SubmissionPipeline {
    pub fn new(endpoint: Arc<dyn ImageEndpoint>, log: SessionLog, max_prompt_chars: usize) -> Self {
        Self {
            endpoint,
            log,
            max_prompt_chars,
        }
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Check a prompt and return the text that will be sent
    pub fn validate_prompt(&self, prompt: &str) -> Result<String, ValidationError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }
        let len = prompt.chars().count();
        if len > self.max_prompt_chars {
            return Err(ValidationError::PromptTooLong {
                len,
                max: self.max_prompt_chars,
            });
        }
        Ok(prompt.to_owned())
    }

    /// Submit the current content of `surface` together with `prompt`.
    ///
    /// Validation and serialization happen before this returns, so the
    /// payload is fixed even if the surface keeps changing while the request
    /// is in flight. The returned future performs the single network call and,
    /// on success, appends to the session log. Concurrent submissions append
    /// in the order they complete.
    pub fn submit<S: Surface>(&self, prompt: &str, surface: &S) -> BoxFuture<'static, SubmissionResult> {
        let prepared = self.prepare(prompt, surface);
        self.dispatch(prepared)
    }

    fn prepare<S: Surface>(&self, prompt: &str, surface: &S) -> Result<GenerationRequest, SubmissionError> {
        let prompt = self.validate_prompt(prompt)?;
        let sketch = surface.encode()?;
        Ok(GenerationRequest { prompt, sketch })
    }

    fn dispatch(
        &self,
        prepared: Result<GenerationRequest, SubmissionError>,
    ) -> BoxFuture<'static, SubmissionResult> {
        let endpoint = Arc::clone(&self.endpoint);
        let log = self.log.clone();

        async move {
            let request = match prepared {
                Ok(request) => request,
                Err(e) => {
                    log::debug!("Submission rejected before sending: {}", e);
                    return Err(e);
                }
            };
            let prompt = request.prompt.clone();
            let input_snapshot = request.sketch.clone();
            log::info!(
                "Submitting sketch ({} bytes) with prompt {:?}",
                input_snapshot.len(),
                prompt
            );

            let response = endpoint.generate(request).await.map_err(|e| {
                log::warn!("Submission failed: {}", e);
                e
            })?;
            let output_image = interpret_response(response)?;

            let record = Arc::new(SubmissionRecord::new(prompt, input_snapshot, output_image));
            log.append(Arc::clone(&record));
            log::info!("Submission {} completed", record.id);
            Ok(record)
        }
        .boxed()
    }
}

/// Turn an endpoint response into the generated image, or the matching error
fn interpret_response(response: GenerationResponse) -> Result<EncodedImage, SubmissionError> {
    if !response.is_success() {
        log::warn!(
            "Endpoint returned HTTP {} {}: {}",
            response.status,
            response.reason,
            describe_body(&response.body)
        );
        return Err(TransportError::Status {
            status: response.status,
            reason: response.reason,
        }
        .into());
    }

    let content_type = response.content_type.unwrap_or_default();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !mime.starts_with("image/") {
        let detail = describe_body(&response.body);
        log::warn!("Expected an image, endpoint sent {:?}: {}", content_type, detail);
        return Err(SubmissionError::UnexpectedResponse { content_type, detail });
    }

    let output = EncodedImage::new(mime, response.body);
    if let Err(e) = output.decode() {
        log::warn!("Endpoint sent an undecodable {}: {}", output.content_type(), e);
        return Err(SubmissionError::UnexpectedResponse {
            content_type,
            detail: e.to_string(),
        });
    }
    Ok(output)
}

/// Short human readable summary of a non-image body, for diagnostics
fn describe_body(body: &[u8]) -> String {
    const MAX_DETAIL_CHARS: usize = 200;

    // Error payloads are usually JSON carrying a message field
    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(serde_json::Value::String(message)) = fields.get(key) {
                return message.chars().take(MAX_DETAIL_CHARS).collect();
            }
        }
    }

    if body.is_empty() {
        return "<empty body>".to_owned();
    }
    String::from_utf8_lossy(body).chars().take(MAX_DETAIL_CHARS).collect()
}
