use std::sync::Arc;

use image::RgbaImage;

use crate::error::SurfaceResult;

/// MIME type of the lossless format the canvas is serialized to
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Immutable encoded image data, cheap to clone and share.
///
/// Used for history snapshots, submission payloads and generated results.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    content_type: String,
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Wrap bytes already encoded as PNG
    pub fn png(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(PNG_CONTENT_TYPE, bytes)
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into an RGBA pixel buffer, sniffing the format from the data
    pub fn decode(&self) -> SurfaceResult<RgbaImage> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("content_type", &self.content_type)
            .field("bytes", &format!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}
