use std::io::Read;
use std::time::Duration;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::BoxFuture;

use super::{GenerationRequest, GenerationResponse, ImageEndpoint, MultipartForm};
use crate::config::EndpointConfig;
use crate::error::{ConfigError, TransportError};

/// Name of the multipart field carrying the sketch
pub const SKETCH_FIELD: &str = "sketch_file";
/// Name of the multipart field carrying the prompt
pub const PROMPT_FIELD: &str = "prompt";

// Generated images are a few MB at most; anything bigger is not a valid answer
const MAX_RESPONSE_BYTES: u64 = 32 * 1024 * 1024;

/// Image-generation endpoint reached over HTTP.
///
/// `ureq` is blocking, so each request runs on its own worker thread and the
/// result is handed back through a oneshot channel.
#[derive(Clone)]
pub struct HttpEndpoint {
    agent: ureq::Agent,
    url: String,
    credential: Option<(String, String)>,
}

impl std::fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpoint")
            .field("url", &self.url)
            .field(
                "credential",
                &self.credential.as_ref().map(|(header, _)| format!("{}: <redacted>", header)),
            )
            .finish()
    }
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url: url.into(),
            credential: None,
        }
    }

    /// Send `value` in the `header` header with every request
    pub fn with_credential(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.credential = Some((header.into(), value.into()));
        self
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ConfigError> {
        if config.url.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint url is empty".to_owned()));
        }
        let endpoint = Self::new(config.url.trim(), Duration::from_secs(config.timeout_secs));
        Ok(match &config.credential {
            Some(credential) => endpoint.with_credential(&config.credential_header, credential),
            None => endpoint,
        })
    }
}

impl ImageEndpoint for HttpEndpoint {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> BoxFuture<'static, Result<GenerationResponse, TransportError>> {
        let (tx, rx) = oneshot::channel();
        let endpoint = self.clone();

        let spawned = std::thread::Builder::new()
            .name("sketch-submission".to_owned())
            .spawn(move || {
                // The receiver may be gone if the caller dropped the future
                let _ = tx.send(endpoint.send(&request));
            });

        async move {
            if let Err(e) = spawned {
                return Err(TransportError::Connection(format!(
                    "Failed to start request worker: {}",
                    e
                )));
            }
            rx.await.unwrap_or_else(|_| {
                Err(TransportError::Connection(
                    "Request worker exited without a response".to_owned(),
                ))
            })
        }
        .boxed()
    }
}

impl HttpEndpoint {
    fn send(&self, request: &GenerationRequest) -> Result<GenerationResponse, TransportError> {
        let form = MultipartForm::new()
            .text(PROMPT_FIELD, &request.prompt)
            .file(
                SKETCH_FIELD,
                "sketch.png",
                request.sketch.content_type(),
                request.sketch.bytes(),
            );
        let content_type = form.content_type();
        let body = form.finish();

        let mut call = self.agent.post(&self.url).set("Content-Type", &content_type);
        if let Some((header, value)) = &self.credential {
            call = call.set(header, value);
        }

        log::debug!("POST {} ({} byte form)", self.url, body.len());
        match call.send_bytes(&body) {
            Ok(response) => read_response(response),
            // Error statuses still carry a response the pipeline wants to see
            Err(ureq::Error::Status(_, response)) => read_response(response),
            Err(e) => Err(TransportError::Connection(e.to_string())),
        }
    }
}

fn read_response(response: ureq::Response) -> Result<GenerationResponse, TransportError> {
    let status = response.status();
    let reason = response.status_text().to_owned();
    let content_type = response.header("content-type").map(str::to_owned);

    let mut body = Vec::new();
    response
        .into_reader()
        .take(MAX_RESPONSE_BYTES)
        .read_to_end(&mut body)
        .map_err(|e| TransportError::Connection(format!("Failed to read response body: {}", e)))?;

    Ok(GenerationResponse {
        status,
        reason,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_rejects_empty_url() {
        let config = EndpointConfig::default();
        assert!(matches!(
            HttpEndpoint::from_config(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let endpoint = HttpEndpoint::new("http://localhost:9/generate", Duration::from_secs(1))
            .with_credential("x-api-key", "secret-value");
        let printed = format!("{:?}", endpoint);
        assert!(printed.contains("x-api-key"));
        assert!(!printed.contains("secret-value"));
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback
        let endpoint = HttpEndpoint::new("http://127.0.0.1:9/generate", Duration::from_secs(2));
        let request = GenerationRequest {
            prompt: "a cat".to_owned(),
            sketch: crate::snapshot::EncodedImage::png(vec![0u8; 4]),
        };
        let result = futures::executor::block_on(endpoint.generate(request));
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
