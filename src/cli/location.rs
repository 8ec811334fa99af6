use anyhow::{Result, anyhow};
use regex::Regex;

/// Destination given as `<host>/<bucket>/<key>`, the host names an entry of the config file
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct S3Location {
    pub host: String,
    pub bucket: String,
    pub key: Option<String>,
}

impl S3Location {
    /// # Errors
    ///
    /// Will return `Err` if the host or bucket are missing or not valid
    pub fn parse(location: &str) -> Result<Self> {
        let parts: Vec<&str> = location.splitn(3, '/').collect();

        log::debug!("location parts: {parts:?}");

        let host = parts
            .first()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| anyhow!("Host cannot be empty"))?
            .to_string();

        let bucket = parts
            .get(1)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                anyhow!("Bucket name missing, expected format: <s3 provider>/<bucket name>/key")
            })?;

        Self::validate_bucket_name(bucket)?;

        let key = match parts.get(2) {
            Some(k) if k.starts_with('/') => {
                return Err(anyhow!("Please remove leading slashes from key"));
            }
            Some(k) if !k.is_empty() => {
                Self::validate_object_key(k)?;
                Some((*k).to_string())
            }
            _ => None,
        };

        Ok(Self {
            host,
            bucket: (*bucket).to_string(),
            key,
        })
    }

    /// Validate S3 bucket name according to AWS specifications
    /// - Length: 3-63 characters
    /// - Pattern: [a-z0-9][\.\-a-z0-9]{1,61}[a-z0-9]
    fn validate_bucket_name(bucket: &str) -> Result<()> {
        if bucket.len() < 3 || bucket.len() > 63 {
            return Err(anyhow!(
                "Invalid bucket name '{bucket}'. Must be 3-63 characters long"
            ));
        }

        let bucket_regex = Regex::new(r"^[a-z0-9][\.\-a-z0-9]{1,61}[a-z0-9]$")?;

        if !bucket_regex.is_match(bucket) {
            return Err(anyhow!(
                "Invalid bucket name '{bucket}'. Must match pattern: [a-z0-9][\\.-a-z0-9]{{1,61}}[a-z0-9]"
            ));
        }

        Ok(())
    }

    /// Keys are at most 1024 bytes and can not contain null bytes
    fn validate_object_key(key: &str) -> Result<()> {
        if key.len() > 1024 {
            return Err(anyhow!(
                "Object key is too long. Maximum length is 1024 characters"
            ));
        }

        if key.contains('\0') {
            return Err(anyhow!("Object key cannot contain null bytes"));
        }

        if key.chars().any(char::is_control) {
            log::warn!("Object key '{key}' contains control characters which may cause issues");
        }

        Ok(())
    }
}
