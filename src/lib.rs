//! Streaming multipart uploads for S3 compatible storage.
//!
//! [`channel::MultipartUploadChannel`] accepts an open-ended sequence of writes, cuts them into
//! fixed size parts, uploads every part as soon as it fills and completes the object on close.

pub mod channel;
pub mod cli;
pub mod s3;
