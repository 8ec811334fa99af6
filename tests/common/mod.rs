//! In-memory `MultipartBackend` shared by the integration tests, it records every call and
//! can be told to fail any of them

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use anyhow::{Result, anyhow};
use bytes::Bytes;
use s3chan::{
    channel::{
        ChecksumAlgorithm, CompleteMultipartUploadResult, MultipartBackend, ObjectMetadata, Part,
    },
    s3::checksum::Checksum,
};
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const UPLOAD_ID: &str = "upload-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initiate {
        bucket: String,
        key: String,
        meta: BTreeMap<String, String>,
        checksum_algorithm: ChecksumAlgorithm,
    },
    UploadPart {
        part_number: u16,
        body: Bytes,
        checksum: Checksum,
    },
    Complete {
        parts: Vec<Part>,
    },
    Abort,
}

#[derive(Default)]
pub struct MemoryBackend {
    calls: Mutex<Vec<Call>>,
    stored: Mutex<BTreeMap<u16, Bytes>>,
    fail_initiate: bool,
    fail_part: Option<u16>,
    // attempts of `fail_part` that still fail
    part_failures: AtomicUsize,
    fail_complete: bool,
    fail_abort: bool,
    // the first attempt to store this part never returns
    stall_part: Option<u16>,
    stalled: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_initiate(mut self) -> Self {
        self.fail_initiate = true;
        self
    }

    /// The first `times` attempts to store `part_number` fail
    pub fn failing_part(mut self, part_number: u16, times: usize) -> Self {
        self.fail_part = Some(part_number);
        self.part_failures = AtomicUsize::new(times);
        self
    }

    pub fn stalling_part(mut self, part_number: u16) -> Self {
        self.stall_part = Some(part_number);
        self
    }

    pub fn failing_complete(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    pub fn failing_abort(mut self) -> Self {
        self.fail_abort = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every upload attempt, failed ones included
    pub fn part_calls(&self) -> Vec<(u16, Bytes, Checksum)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UploadPart {
                    part_number,
                    body,
                    checksum,
                } => Some((part_number, body, checksum)),
                _ => None,
            })
            .collect()
    }

    /// Bodies of the stored parts in part order
    pub fn stored(&self) -> Vec<Bytes> {
        self.stored.lock().unwrap().values().cloned().collect()
    }

    /// The object as assembled by the last completion
    pub fn object(&self) -> Option<Vec<u8>> {
        let parts = self.calls().into_iter().rev().find_map(|call| match call {
            Call::Complete { parts } => Some(parts),
            _ => None,
        })?;

        let stored = self.stored.lock().unwrap();
        let mut object = Vec::new();
        for part in parts {
            object.extend_from_slice(stored.get(&part.number)?);
        }
        Some(object)
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| f(c)).count()
    }

    pub fn completes(&self) -> usize {
        self.count(|c| matches!(c, Call::Complete { .. }))
    }

    pub fn aborts(&self) -> usize {
        self.count(|c| matches!(c, Call::Abort))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MultipartBackend for MemoryBackend {
    async fn initiate(
        &self,
        bucket: &str,
        key: &str,
        meta: Option<&ObjectMetadata>,
        checksum_algorithm: ChecksumAlgorithm,
    ) -> Result<String> {
        self.record(Call::Initiate {
            bucket: bucket.to_string(),
            key: key.to_string(),
            meta: meta.map(ObjectMetadata::headers).unwrap_or_default(),
            checksum_algorithm,
        });

        if self.fail_initiate {
            return Err(anyhow!("AccessDenied"));
        }

        Ok(UPLOAD_ID.to_string())
    }

    async fn upload_part(
        &self,
        _bucket: &str,
        _key: &str,
        upload_id: &str,
        part_number: u16,
        body: Bytes,
        checksum: &Checksum,
    ) -> Result<String> {
        assert_eq!(upload_id, UPLOAD_ID);

        self.record(Call::UploadPart {
            part_number,
            body: body.clone(),
            checksum: checksum.clone(),
        });

        if self.stall_part == Some(part_number)
            && self.stalled.fetch_add(1, Ordering::SeqCst) == 0
        {
            std::future::pending::<()>().await;
        }

        if self.fail_part == Some(part_number)
            && self
                .part_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(anyhow!("InternalError"));
        }

        self.stored.lock().unwrap().insert(part_number, body);

        Ok(format!("\"etag-{part_number}\""))
    }

    async fn complete(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<CompleteMultipartUploadResult> {
        assert_eq!(upload_id, UPLOAD_ID);

        self.record(Call::Complete {
            parts: parts.to_vec(),
        });

        if self.fail_complete {
            return Err(anyhow!("InvalidPart"));
        }

        Ok(CompleteMultipartUploadResult {
            location: format!("memory://{bucket}/{key}"),
            bucket: bucket.to_string(),
            key: key.to_string(),
            e_tag: format!("\"object-{}\"", parts.len()),
        })
    }

    async fn abort(&self, _bucket: &str, _key: &str, upload_id: &str) -> Result<()> {
        assert_eq!(upload_id, UPLOAD_ID);

        self.record(Call::Abort);

        if self.fail_abort {
            return Err(anyhow!("NoSuchUpload"));
        }

        Ok(())
    }
}

/// Deterministic test payload
pub fn payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from((i * 31 + i / 7) % 251).unwrap())
        .collect()
}
