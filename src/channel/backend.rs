use super::ObjectMetadata;
use crate::s3::{
    S3,
    actions::{
        AbortMultipartUpload, CompleteMultipartUpload, CreateMultipartUpload, Part, UploadPart,
    },
    checksum::{Checksum, ChecksumAlgorithm},
    responses::CompleteMultipartUploadResult,
};
use anyhow::Result;
use bytes::Bytes;
use std::future::Future;

/// The multipart calls a channel needs from a storage service
pub trait MultipartBackend {
    /// Starts an upload and returns its upload-id
    fn initiate(
        &self,
        bucket: &str,
        key: &str,
        meta: Option<&ObjectMetadata>,
        checksum_algorithm: ChecksumAlgorithm,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Stores one part and returns its `ETag`
    fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u16,
        body: Bytes,
        checksum: &Checksum,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Assembles the object from `parts`, given in ascending part order
    fn complete(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> impl Future<Output = Result<CompleteMultipartUploadResult>> + Send;

    /// Discards the upload and every part stored for it
    fn abort(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl MultipartBackend for S3 {
    async fn initiate(
        &self,
        bucket: &str,
        key: &str,
        meta: Option<&ObjectMetadata>,
        checksum_algorithm: ChecksumAlgorithm,
    ) -> Result<String> {
        let action =
            CreateMultipartUpload::new(bucket, key, meta.map(ObjectMetadata::headers), checksum_algorithm);
        let response = action.request(self).await?;
        Ok(response.upload_id)
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u16,
        body: Bytes,
        checksum: &Checksum,
    ) -> Result<String> {
        let action = UploadPart::new(bucket, key, upload_id, part_number, body, checksum);
        action.request(self).await
    }

    async fn complete(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<CompleteMultipartUploadResult> {
        let action = CompleteMultipartUpload::new(bucket, key, upload_id, parts);
        action.request(self).await
    }

    async fn abort(&self, bucket: &str, key: &str, upload_id: &str) -> Result<()> {
        let action = AbortMultipartUpload::new(bucket, key, upload_id);
        action.request(self).await
    }
}
