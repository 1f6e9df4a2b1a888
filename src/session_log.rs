use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::snapshot::EncodedImage;

/// A completed submission: the sketch that was sent and what came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: Uuid,
    /// Seconds since the UNIX epoch at which the response arrived
    pub created_at: u64,
    pub prompt: String,
    pub input_snapshot: EncodedImage,
    pub output_image: EncodedImage,
}

impl SubmissionRecord {
    pub fn new(prompt: String, input_snapshot: EncodedImage, output_image: EncodedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: timestamp_secs(),
            prompt,
            input_snapshot,
            output_image,
        }
    }
}

/// Append-only record of the session's successful submissions.
///
/// Cloning yields another handle to the same log, which lets pending
/// submissions append without holding on to the editing session.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    records: Arc<RwLock<Vec<Arc<SubmissionRecord>>>>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record after all existing ones
    pub fn append(&self, record: Arc<SubmissionRecord>) {
        let mut records = self.records.write();
        records.push(record);
        log::debug!("Session log now holds {} submissions", records.len());
    }

    /// The records as of this call, oldest first.
    ///
    /// Later appends do not show up in the returned list.
    pub fn entries(&self) -> Vec<Arc<SubmissionRecord>> {
        self.records.read().clone()
    }

    pub fn latest(&self) -> Option<Arc<SubmissionRecord>> {
        self.records.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn timestamp_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
