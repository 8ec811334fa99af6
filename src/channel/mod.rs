//! Streaming multipart uploads
//!
//! A [`MultipartUploadChannel`] accepts writes of any size, cuts them into parts of
//! `part_size` bytes, stores every full part as soon as it fills and assembles the object
//! when closed. Parts are stored one at a time and in order, memory use is bounded by one
//! part.
//!
//! Dropping a `write` or `close` future while a part is being stored leaves the channel
//! `Failed` with the part still buffered, [`MultipartUploadChannel::abort`] discards the
//! upload.
//!
//! ```no_run
//! # async fn run(s3: &s3chan::s3::S3) -> anyhow::Result<()> {
//! use s3chan::channel::{ChannelOptions, MultipartUploadChannel};
//!
//! let options = ChannelOptions::default().with_part_size(10);
//! let mut channel = MultipartUploadChannel::with_options(s3, "bucket", "key", None, options).await?;
//! channel.write(b"ABCDEFGHIJ").await?;
//! channel.write(b"KLM").await?;
//! let object = channel.close().await?;
//! println!("{}", object.e_tag);
//! # Ok(())
//! # }
//! ```

mod backend;
pub use self::backend::MultipartBackend;

mod error;
pub use self::error::ChannelError;

mod options;
pub use self::options::{ChannelOptions, ObjectMetadata};

mod reader;
pub use self::reader::upload_from;

pub use crate::s3::{
    actions::Part,
    checksum::{Checksum, ChecksumAlgorithm},
    responses::CompleteMultipartUploadResult,
};

use crate::s3::{checksum::hasher::PartHasher, limits::MAX_PARTS_PER_UPLOAD};
use anyhow::anyhow;
use bytes::{Bytes, BytesMut};
use std::mem;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Open,
    /// The object was assembled
    Closed,
    /// A part upload or the completion failed
    Failed,
    /// The upload and its stored parts were discarded
    Aborted,
}

pub struct MultipartUploadChannel<'a, B: MultipartBackend> {
    backend: &'a B,
    bucket: String,
    key: String,
    upload_id: String,
    options: ChannelOptions,
    buffer: BytesMut,
    hasher: PartHasher,
    parts: Vec<Part>,
    part_number: u16,
    state: State,
}

impl<'a, B: MultipartBackend> MultipartUploadChannel<'a, B> {
    /// Starts the upload with the default options
    ///
    /// # Errors
    ///
    /// Will return `SessionInitiation` if the upload can not be started
    pub async fn new(
        backend: &'a B,
        bucket: &str,
        key: &str,
        meta: Option<ObjectMetadata>,
    ) -> Result<Self, ChannelError> {
        Self::with_options(backend, bucket, key, meta, ChannelOptions::default()).await
    }

    /// # Errors
    ///
    /// Will return `SessionInitiation` if the arguments are invalid or the upload can not be
    /// started
    pub async fn with_options(
        backend: &'a B,
        bucket: &str,
        key: &str,
        meta: Option<ObjectMetadata>,
        options: ChannelOptions,
    ) -> Result<Self, ChannelError> {
        if bucket.is_empty() {
            return Err(ChannelError::SessionInitiation(anyhow!("bucket name is empty")));
        }

        if key.is_empty() {
            return Err(ChannelError::SessionInitiation(anyhow!("object key is empty")));
        }

        if options.part_size == 0 {
            return Err(ChannelError::SessionInitiation(anyhow!(
                "part size must be greater than 0"
            )));
        }

        let upload_id = backend
            .initiate(bucket, key, meta.as_ref(), options.checksum_algorithm)
            .await
            .map_err(ChannelError::SessionInitiation)?;

        log::info!("initiated multipart upload {upload_id} for {bucket}/{key}");

        Ok(Self {
            backend,
            bucket: bucket.to_string(),
            key: key.to_string(),
            upload_id,
            buffer: BytesMut::with_capacity(options.part_size),
            hasher: PartHasher::new(options.checksum_algorithm),
            parts: Vec::new(),
            part_number: 1,
            state: State::Open,
            options,
        })
    }

    /// Buffers `bytes`, storing a part every time the buffer fills. Returns the number of
    /// bytes accepted, always the length of `bytes`.
    ///
    /// # Errors
    ///
    /// Will return `ChannelClosed` if the channel is not open or `PartUpload` if a part can
    /// not be stored
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize, ChannelError> {
        if self.state != State::Open {
            return Err(ChannelError::ChannelClosed);
        }

        let mut remaining = bytes;

        loop {
            let room = self.options.part_size.saturating_sub(self.buffer.len());
            let (head, tail) = remaining.split_at(room.min(remaining.len()));

            self.buffer.extend_from_slice(head);
            self.hasher.update(head);
            remaining = tail;

            if self.buffer.len() >= self.options.part_size {
                self.flush().await?;
            }

            if remaining.is_empty() {
                break;
            }
        }

        Ok(bytes.len())
    }

    /// Stores the last part and assembles the object, the channel is closed even if this
    /// fails
    ///
    /// # Errors
    ///
    /// Will return `ChannelClosed` if called more than once, `PartUpload` if the last part
    /// can not be stored or `SessionCompletion` if the object can not be assembled
    pub async fn close(&mut self) -> Result<CompleteMultipartUploadResult, ChannelError> {
        if self.state != State::Open {
            return Err(ChannelError::ChannelClosed);
        }

        self.state = State::Closed;

        // an empty stream still needs one (empty) part to complete
        if !self.buffer.is_empty() || self.parts.is_empty() {
            self.flush().await?;
        }

        log::debug!(
            "completing multipart upload {} with {} parts",
            self.upload_id,
            self.parts.len()
        );

        match self
            .backend
            .complete(&self.bucket, &self.key, &self.upload_id, &self.parts)
            .await
        {
            Ok(result) => {
                log::info!(
                    "completed multipart upload {} for {}/{}, etag: {}",
                    self.upload_id,
                    self.bucket,
                    self.key,
                    result.e_tag
                );
                Ok(result)
            }
            Err(e) => Err(self.fail(ChannelError::SessionCompletion(e)).await),
        }
    }

    /// Discards the upload and the parts stored so far
    ///
    /// # Errors
    ///
    /// Will return `ChannelClosed` if the object was already assembled or discarded, or
    /// `SessionAbort` if the backend call fails
    pub async fn abort(&mut self) -> Result<(), ChannelError> {
        if !matches!(self.state, State::Open | State::Failed) {
            return Err(ChannelError::ChannelClosed);
        }

        if let Err(e) = self
            .backend
            .abort(&self.bucket, &self.key, &self.upload_id)
            .await
        {
            self.state = State::Failed;
            return Err(ChannelError::SessionAbort(e));
        }

        log::info!("aborted multipart upload {}", self.upload_id);

        self.state = State::Aborted;

        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ChannelError> {
        let part_number = self.part_number;

        if part_number > MAX_PARTS_PER_UPLOAD {
            let error = ChannelError::PartUpload {
                part_number,
                source: anyhow!("exceeds the maximum of {MAX_PARTS_PER_UPLOAD} parts"),
            };
            return Err(self.fail(error).await);
        }

        // the part leaves the buffer only once stored
        let checksum = self.hasher.checksum();
        let body = Bytes::copy_from_slice(&self.buffer);
        let size = body.len();

        // a dropped future leaves the channel Failed, it can only be aborted
        let state = mem::replace(&mut self.state, State::Failed);

        match self.upload_part(part_number, &body, &checksum).await {
            Ok(etag) => {
                log::info!("uploaded part: {part_number}, etag: {etag}");

                self.state = state;
                self.parts.push(Part {
                    number: part_number,
                    etag,
                    checksum: checksum.algorithm.as_xml_field().map(|_| checksum),
                });
                self.part_number = part_number.saturating_add(1);
                self.buffer.clear();
                self.hasher.reset();

                if let Some(progress) = &self.options.progress
                    && let Err(e) = progress.send(size)
                {
                    log::debug!("progress receiver dropped: {e}");
                }

                Ok(())
            }

            Err(e) => {
                let error = ChannelError::PartUpload {
                    part_number,
                    source: e,
                };
                Err(self.fail(error).await)
            }
        }
    }

    async fn upload_part(
        &self,
        part_number: u16,
        body: &Bytes,
        checksum: &Checksum,
    ) -> anyhow::Result<String> {
        let attempts = self.options.retries.max(1);

        let mut attempt = 1;
        loop {
            match self
                .backend
                .upload_part(
                    &self.bucket,
                    &self.key,
                    &self.upload_id,
                    part_number,
                    body.clone(),
                    checksum,
                )
                .await
            {
                Ok(etag) => return Ok(etag),

                Err(e) if attempt < attempts => {
                    let backoff = self
                        .options
                        .backoff
                        .saturating_mul(2_u32.saturating_pow(u32::from(attempt - 1)));

                    log::warn!(
                        "Error uploading part number {part_number}, attempt {attempt}/{attempts} failed: {e}, retrying in {backoff:?}"
                    );

                    sleep(backoff).await;
                    attempt += 1;
                }

                Err(e) => return Err(e),
            }
        }
    }

    // moves to Failed, discarding the upload first when configured to
    async fn fail(&mut self, error: ChannelError) -> ChannelError {
        self.state = State::Failed;

        log::error!("multipart upload {} failed: {error}", self.upload_id);

        if self.options.abort_on_failure {
            match self
                .backend
                .abort(&self.bucket, &self.key, &self.upload_id)
                .await
            {
                Ok(()) => {
                    log::info!("aborted multipart upload {}", self.upload_id);
                    self.state = State::Aborted;
                }
                Err(e) => log::error!("could not abort multipart upload {}: {e}", self.upload_id),
            }
        }

        error
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Parts stored so far, in ascending order
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Number the next part will be stored with
    #[must_use]
    pub const fn part_number(&self) -> u16 {
        self.part_number
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Bytes written but not stored yet
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub const fn options(&self) -> &ChannelOptions {
        &self.options
    }
}

impl<B: MultipartBackend> Drop for MultipartUploadChannel<'_, B> {
    fn drop(&mut self) {
        if matches!(self.state, State::Open | State::Failed) {
            log::warn!(
                "multipart upload {} for {}/{} dropped before close, stored parts are left dangling",
                self.upload_id,
                self.bucket,
                self.key
            );
        }
    }
}
