pub mod actions;
pub mod checksum;
pub mod credentials;
pub mod limits;
pub mod region;
pub mod request;
pub mod responses;
pub mod signature;
pub mod tools;

pub use self::{credentials::Credentials, region::Region, signature::Signature};

use anyhow::Result;
use std::fmt;
use url::Url;

#[derive(Debug, Clone)]
pub struct S3 {
    // AWS Credentials
    credentials: Credentials,
    // AWS Region
    region: Region,
}

// Amazon S3 API Reference
// <https://docs.aws.amazon.com/AmazonS3/latest/API/API_Operations.html>
impl S3 {
    #[must_use]
    pub fn new(credentials: &Credentials, region: &Region) -> Self {
        Self {
            credentials: credentials.clone(),
            region: region.clone(),
        }
    }

    /// Base URL of the service, buckets are addressed path-style on top of it
    ///
    /// # Errors
    ///
    /// Will return `Err` if the endpoint is not a valid URL
    pub fn endpoint(&self) -> Result<Url> {
        let endpoint = self.region.endpoint();
        let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(&endpoint)?
        } else {
            Url::parse(&format!("https://{endpoint}"))?
        };
        Ok(url)
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }
}

impl fmt::Display for S3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "region: {}", self.region.name())?;
        writeln!(f, "endpoint: {}", self.region.endpoint())?;
        write!(
            f,
            "access key: {}",
            self.credentials.aws_access_key_id()
        )
    }
}
