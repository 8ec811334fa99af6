use super::{MultipartBackend, MultipartUploadChannel};
use anyhow::Result;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::{BytesCodec, FramedRead};

/// Streams `reader` into `channel` until EOF, returns the number of bytes copied. The
/// channel is left open, closing it is up to the caller.
///
/// # Errors
///
/// Will return `Err` if `reader` fails or a part can not be stored
pub async fn upload_from<R, B>(reader: R, channel: &mut MultipartUploadChannel<'_, B>) -> Result<usize>
where
    R: AsyncRead + Unpin,
    B: MultipartBackend,
{
    let mut stream = FramedRead::new(reader, BytesCodec::new());
    let mut total = 0;

    while let Some(bytes) = stream.try_next().await? {
        total += channel.write(&bytes).await?;
    }

    log::debug!("read {total} bytes into upload {}", channel.upload_id());

    Ok(total)
}
