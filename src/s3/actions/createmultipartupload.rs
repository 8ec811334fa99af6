use crate::s3::{
    S3,
    actions::{Action, object_path, response_error},
    checksum::ChecksumAlgorithm,
    request,
    responses::InitiateMultipartUploadResult,
    tools,
};
use anyhow::{Result, anyhow};
use quick_xml::de::from_str;
use reqwest::Method;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct CreateMultipartUpload<'a> {
    bucket: &'a str,
    key: &'a str,
    meta: Option<BTreeMap<String, String>>,
    checksum_algorithm: ChecksumAlgorithm,
}

impl<'a> CreateMultipartUpload<'a> {
    /// `meta` holds complete header names, for example `content-type` or `x-amz-meta-title`
    #[must_use]
    pub const fn new(
        bucket: &'a str,
        key: &'a str,
        meta: Option<BTreeMap<String, String>>,
        checksum_algorithm: ChecksumAlgorithm,
    ) -> Self {
        Self {
            bucket,
            key,
            meta,
            checksum_algorithm,
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(&self, s3: &S3) -> Result<InitiateMultipartUploadResult> {
        let (url, headers) = &self.sign(s3, tools::sha256_digest("").as_ref(), None)?;

        let response = request::request(url.clone(), self.http_method()?, headers, None).await?;

        if response.status().is_success() {
            let upload_req: InitiateMultipartUploadResult = from_str(&response.text().await?)?;
            Ok(upload_req)
        } else {
            Err(anyhow!(response_error(response).await?))
        }
    }
}

impl Action for CreateMultipartUpload<'_> {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::POST)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();

        if let Some(meta) = &self.meta {
            for (k, v) in meta {
                map.insert(k.as_str(), v.as_str());
            }
        }

        if let Some(algorithm) = self.checksum_algorithm.as_algorithm() {
            map.insert("x-amz-checksum-algorithm", algorithm);
        }

        Some(map)
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();
        map.insert("uploads", "");
        Some(map)
    }

    fn path(&self) -> Option<Vec<&str>> {
        Some(object_path(self.bucket, self.key))
    }
}
