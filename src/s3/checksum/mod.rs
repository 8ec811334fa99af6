//! Per-part integrity digests
//! <https://docs.aws.amazon.com/AmazonS3/latest/userguide/checking-object-integrity.html>

pub mod hasher;

use self::hasher::PartHasher;
use base64ct::{Base64, Encoding};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum ChecksumAlgorithm {
    #[default]
    Md5,
    Crc32,
    Crc32c,
    Sha1,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Header carrying the base64 digest of a request body
    #[must_use]
    pub const fn as_amz(&self) -> &'static str {
        match self {
            Self::Md5 => "content-md5",
            Self::Crc32 => "x-amz-checksum-crc32",
            Self::Crc32c => "x-amz-checksum-crc32c",
            Self::Sha1 => "x-amz-checksum-sha1",
            Self::Sha256 => "x-amz-checksum-sha256",
        }
    }

    /// Value for `x-amz-checksum-algorithm`, MD5 is not an additional checksum
    #[must_use]
    pub const fn as_algorithm(&self) -> Option<&'static str> {
        match self {
            Self::Md5 => None,
            Self::Crc32 => Some("CRC32"),
            Self::Crc32c => Some("CRC32C"),
            Self::Sha1 => Some("SHA1"),
            Self::Sha256 => Some("SHA256"),
        }
    }

    /// Element naming the part checksum in a `CompleteMultipartUpload` body
    #[must_use]
    pub const fn as_xml_field(&self) -> Option<&'static str> {
        match self {
            Self::Md5 => None,
            Self::Crc32 => Some("ChecksumCRC32"),
            Self::Crc32c => Some("ChecksumCRC32C"),
            Self::Sha1 => Some("ChecksumSHA1"),
            Self::Sha256 => Some("ChecksumSHA256"),
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = String;

    fn from_str(algorithm: &str) -> Result<Self, Self::Err> {
        match algorithm.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "crc32" => Ok(Self::Crc32),
            "crc32c" => Ok(Self::Crc32c),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(format!("unsupported checksum algorithm: {other}")),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_algorithm().unwrap_or("MD5"))
    }
}

/// A finished digest, `checksum` is base64 encoded as the headers expect it
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub checksum: String,
}

impl Checksum {
    #[must_use]
    pub fn new(algorithm: ChecksumAlgorithm, digest: &[u8]) -> Self {
        Self {
            algorithm,
            checksum: Base64::encode_string(digest),
        }
    }

    /// Digest of a complete payload in one go
    #[must_use]
    pub fn compute(algorithm: ChecksumAlgorithm, bytes: &[u8]) -> Self {
        let mut hasher = PartHasher::new(algorithm);
        hasher.update(bytes);
        hasher.checksum()
    }
}
