use super::{Checksum, ChecksumAlgorithm};
use ring::digest::{Context, SHA1_FOR_LEGACY_USE_ONLY, SHA256};

/// Running digest of the bytes buffered for one part
///
/// Reading the checksum does not consume the state, so a part can be hashed once and
/// uploaded as many times as needed. [`PartHasher::reset`] starts the next part.
#[derive(Clone)]
pub enum PartHasher {
    Md5(md5::Context),
    Crc32(crc32fast::Hasher),
    Crc32c(u32),
    Sha1(Context),
    Sha256(Context),
}

impl PartHasher {
    #[must_use]
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            ChecksumAlgorithm::Crc32 => Self::Crc32(crc32fast::Hasher::new()),
            ChecksumAlgorithm::Crc32c => Self::Crc32c(0),
            ChecksumAlgorithm::Sha1 => Self::Sha1(Context::new(&SHA1_FOR_LEGACY_USE_ONLY)),
            ChecksumAlgorithm::Sha256 => Self::Sha256(Context::new(&SHA256)),
        }
    }

    #[must_use]
    pub const fn algorithm(&self) -> ChecksumAlgorithm {
        match self {
            Self::Md5(_) => ChecksumAlgorithm::Md5,
            Self::Crc32(_) => ChecksumAlgorithm::Crc32,
            Self::Crc32c(_) => ChecksumAlgorithm::Crc32c,
            Self::Sha1(_) => ChecksumAlgorithm::Sha1,
            Self::Sha256(_) => ChecksumAlgorithm::Sha256,
        }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(bytes),
            Self::Crc32(hasher) => hasher.update(bytes),
            Self::Crc32c(crc) => *crc = crc32c::crc32c_append(*crc, bytes),
            Self::Sha1(ctx) | Self::Sha256(ctx) => ctx.update(bytes),
        }
    }

    /// Checksum of everything fed since the last reset
    #[must_use]
    pub fn checksum(&self) -> Checksum {
        let digest = match self.clone() {
            Self::Md5(ctx) => ctx.finalize().0.to_vec(),
            Self::Crc32(hasher) => hasher.finalize().to_be_bytes().to_vec(),
            Self::Crc32c(crc) => crc.to_be_bytes().to_vec(),
            Self::Sha1(ctx) | Self::Sha256(ctx) => ctx.finish().as_ref().to_vec(),
        };

        Checksum::new(self.algorithm(), &digest)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.algorithm());
    }
}
