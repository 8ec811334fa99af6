use std::{error::Error, fmt};

/// Failures of a [`MultipartUploadChannel`](super::MultipartUploadChannel), every backend
/// failure keeps its cause available through [`Error::source`]
#[derive(Debug)]
pub enum ChannelError {
    /// The upload could not be started, no channel exists
    SessionInitiation(anyhow::Error),
    /// write or close after the channel left the open state
    ChannelClosed,
    /// Storing a part failed, the bytes of the part are still buffered
    PartUpload {
        part_number: u16,
        source: anyhow::Error,
    },
    /// The parts were stored but could not be assembled into the object
    SessionCompletion(anyhow::Error),
    /// An explicit abort failed, parts may still be dangling
    SessionAbort(anyhow::Error),
}

impl ChannelError {
    /// Part number of a failed part upload
    #[must_use]
    pub const fn part_number(&self) -> Option<u16> {
        match self {
            Self::PartUpload { part_number, .. } => Some(*part_number),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionInitiation(e) => write!(f, "could not initiate multipart upload: {e}"),
            Self::ChannelClosed => write!(f, "channel is closed"),
            Self::PartUpload {
                part_number,
                source,
            } => write!(f, "could not upload part {part_number}: {source}"),
            Self::SessionCompletion(e) => write!(f, "could not complete multipart upload: {e}"),
            Self::SessionAbort(e) => write!(f, "could not abort multipart upload: {e}"),
        }
    }
}

impl Error for ChannelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let source: &anyhow::Error = match self {
            Self::ChannelClosed => return None,
            Self::SessionInitiation(e)
            | Self::SessionCompletion(e)
            | Self::SessionAbort(e)
            | Self::PartUpload { source: e, .. } => e,
        };
        let source: &(dyn Error + 'static) = source.as_ref();
        Some(source)
    }
}
