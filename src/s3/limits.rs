//! Multipart upload limits
//!
//! <https://docs.aws.amazon.com/AmazonS3/latest/userguide/qfacts.html>

/// Part size used when nothing else is configured
pub const DEFAULT_PART_SIZE_BYTES: usize = 5_000_000;

/// Maximum size of a single multipart upload part, 5 GiB
pub const MAX_PART_SIZE_BYTES: u64 = 5_368_709_120;

/// Minimum size of every part except the last one, 5 MiB
pub const MIN_PART_SIZE_BYTES: u64 = 5_242_880;

/// Parts are numbered 1 to 10,000
pub const MAX_PARTS_PER_UPLOAD: u16 = 10_000;

/// Maximum size of a single object, 5 TiB
pub const MAX_OBJECT_SIZE_BYTES: u64 = 5_497_558_138_880;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_sane() {
        const _: () = assert!(MAX_OBJECT_SIZE_BYTES > MAX_PART_SIZE_BYTES);
        const _: () = assert!(MAX_PART_SIZE_BYTES > MIN_PART_SIZE_BYTES);

        let max_uploadable = MAX_PART_SIZE_BYTES * u64::from(MAX_PARTS_PER_UPLOAD);
        assert!(max_uploadable >= MAX_OBJECT_SIZE_BYTES);
    }

    #[test]
    fn test_default_part_size_fits_limits() {
        assert!((DEFAULT_PART_SIZE_BYTES as u64) < MAX_PART_SIZE_BYTES);
    }
}
