//! Amazon S3 multipart upload limits
//! Maximum object size 5 TB
//! Maximum number of parts per upload  10,000
//! <https://docs.aws.amazon.com/AmazonS3/latest/dev/qfacts.html>

use crate::s3::{
    S3,
    actions::{Action, object_path, response_error},
    checksum::Checksum,
    request,
    responses::{CompleteMultipartUploadResult, ErrorResponse},
    tools,
};
use anyhow::{Result, anyhow};
use bytes::Bytes;
use quick_xml::{de::from_str, se::to_string};
use reqwest::Method;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CompleteMultipartUpload<'a> {
    bucket: &'a str,
    key: &'a str,
    upload_id: &'a str,
    parts: &'a [Part],
}

impl Serialize for CompleteMultipartUpload<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_struct("CompleteMultipartUpload", self.parts.len())?;
        for part in self.parts {
            map.serialize_field("Part", part)?;
        }
        map.end()
    }
}

/// A stored part, `checksum` is only echoed back for the additional checksum algorithms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub number: u16,
    pub etag: String,
    pub checksum: Option<Checksum>,
}

impl Serialize for Part {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let field = self
            .checksum
            .as_ref()
            .and_then(|c| c.algorithm.as_xml_field().map(|f| (f, &c.checksum)));

        let mut map = serializer.serialize_struct("Part", 2 + usize::from(field.is_some()))?;
        if let Some((name, value)) = field {
            map.serialize_field(name, value)?;
        }
        map.serialize_field("ETag", &self.etag)?;
        map.serialize_field("PartNumber", &self.number)?;
        map.end()
    }
}

impl<'a> CompleteMultipartUpload<'a> {
    #[must_use]
    pub const fn new(bucket: &'a str, key: &'a str, upload_id: &'a str, parts: &'a [Part]) -> Self {
        Self {
            bucket,
            key,
            upload_id,
            parts,
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(&self, s3: &S3) -> Result<CompleteMultipartUploadResult> {
        let body = to_string(&self)?;
        let digest = tools::sha256_digest(&body);
        let (url, headers) = &self.sign(s3, digest.as_ref(), Some(body.len()))?;

        let response = request::request(
            url.clone(),
            self.http_method()?,
            headers,
            Some(Bytes::from(body)),
        )
        .await?;

        if !response.status().is_success() {
            return Err(anyhow!(response_error(response).await?));
        }

        // a 200 can still carry an error document once the assembly fails
        let body = response.text().await?;
        match from_str::<CompleteMultipartUploadResult>(&body) {
            Ok(result) => Ok(result),
            Err(e) => match from_str::<ErrorResponse>(&body) {
                Ok(error) => Err(anyhow!("Code: {}, Message: {}", error.code, error.message)),
                Err(_) => Err(anyhow!("could not parse response: {e}")),
            },
        }
    }
}

impl Action for CompleteMultipartUpload<'_> {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::POST)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();
        map.insert("content-type", "application/xml");
        Some(map)
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();
        map.insert("uploadId", self.upload_id);
        Some(map)
    }

    fn path(&self) -> Option<Vec<&str>> {
        Some(object_path(self.bucket, self.key))
    }
}
