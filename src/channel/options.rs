use crate::s3::{checksum::ChecksumAlgorithm, limits::DEFAULT_PART_SIZE_BYTES};
use std::{collections::BTreeMap, time::Duration};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone)]
pub struct ChannelOptions {
    /// Size of every part except the last one
    pub part_size: usize,
    pub checksum_algorithm: ChecksumAlgorithm,
    /// Attempts per part, 1 means no retry
    pub retries: u8,
    /// Wait before the first retry, doubled on every further attempt
    pub backoff: Duration,
    pub abort_on_failure: bool,
    /// Receives the size of every stored part
    pub progress: Option<UnboundedSender<usize>>,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE_BYTES,
            checksum_algorithm: ChecksumAlgorithm::default(),
            retries: 1,
            backoff: Duration::from_secs(1),
            abort_on_failure: false,
            progress: None,
        }
    }
}

impl ChannelOptions {
    #[must_use]
    pub const fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size;
        self
    }

    #[must_use]
    pub const fn with_checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.checksum_algorithm = algorithm;
        self
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u8, backoff: Duration) -> Self {
        self.retries = retries;
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub const fn with_abort_on_failure(mut self, abort: bool) -> Self {
        self.abort_on_failure = abort;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, sender: UnboundedSender<usize>) -> Self {
        self.progress = Some(sender);
        self
    }
}

/// Sent once when the upload is initiated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_type: Option<String>,
    /// User defined pairs, stored as `x-amz-meta-<key>`
    pub user: BTreeMap<String, String>,
}

impl ObjectMetadata {
    #[must_use]
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    #[must_use]
    pub fn with_user(mut self, key: &str, value: &str) -> Self {
        self.user.insert(key.to_string(), value.to_string());
        self
    }

    /// Request headers, keys are lower case as the signature needs them
    #[must_use]
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();

        if let Some(content_type) = &self.content_type {
            headers.insert("content-type".to_string(), content_type.clone());
        }

        for (k, v) in &self.user {
            let k = k.to_lowercase();
            let name = if k.starts_with("x-amz-meta-") {
                k
            } else {
                format!("x-amz-meta-{k}")
            };
            headers.insert(name, v.clone());
        }

        headers
    }
}
