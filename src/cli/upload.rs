use crate::{
    channel::{
        ChannelOptions, ChecksumAlgorithm, CompleteMultipartUploadResult, MultipartBackend,
        MultipartUploadChannel, ObjectMetadata, State, upload_from,
    },
    cli::progressbar::Bar,
    s3::limits::{MAX_OBJECT_SIZE_BYTES, MAX_PART_SIZE_BYTES, MAX_PARTS_PER_UPLOAD},
};
use anyhow::{Context, Result, anyhow};
use std::{path::PathBuf, time::Duration};
use tokio::{fs::File, sync::mpsc::unbounded_channel, task::JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub source: Source,
    pub bucket: String,
    pub key: String,
    pub meta: ObjectMetadata,
    pub part_size: usize,
    pub checksum: ChecksumAlgorithm,
    pub retries: u8,
    pub abort_on_failure: bool,
    pub quiet: bool,
}

/// Streams the source through a [`MultipartUploadChannel`], Ctrl-C discards the upload
///
/// # Errors
///
/// Will return `Err` if the source can not be read or the upload fails
pub async fn upload<B: MultipartBackend>(
    backend: &B,
    upload: &Upload,
) -> Result<CompleteMultipartUploadResult> {
    let size = match &upload.source {
        Source::File(path) => Some(
            tokio::fs::metadata(path)
                .await
                .with_context(|| format!("could not read {}", path.display()))?
                .len(),
        ),
        Source::Stdin => None,
    };

    check_limits(size, upload.part_size)?;

    let mut options = ChannelOptions::default()
        .with_part_size(upload.part_size)
        .with_checksum(upload.checksum)
        .with_retries(upload.retries, Duration::from_secs(1))
        .with_abort_on_failure(upload.abort_on_failure);

    let progress = if upload.quiet {
        None
    } else {
        let (sender, receiver) = unbounded_channel::<usize>();
        options = options.with_progress(sender);
        Some(progress_bar(size, receiver))
    };

    let mut channel = MultipartUploadChannel::with_options(
        backend,
        &upload.bucket,
        &upload.key,
        Some(upload.meta.clone()),
        options,
    )
    .await?;

    let copied = tokio::select! {
        rs = copy(&upload.source, &mut channel) => rs,
        _ = tokio::signal::ctrl_c() => Err(anyhow!("interrupted")),
    };

    let result = match copied {
        Ok(bytes) => {
            log::info!("read {bytes} bytes, completing upload {}", channel.upload_id());
            channel.close().await.map_err(anyhow::Error::from)
        }

        Err(e) => {
            // abort_on_failure may have discarded it already
            if matches!(channel.state(), State::Open | State::Failed)
                && let Err(abort) = channel.abort().await
            {
                log::error!("{abort}");
            }
            Err(e)
        }
    };

    // closes the progress channel
    drop(channel);

    if let Some(handle) = progress
        && let Err(e) = handle.await
    {
        log::error!("progress bar: {e}");
    }

    result
}

async fn copy<B: MultipartBackend>(
    source: &Source,
    channel: &mut MultipartUploadChannel<'_, B>,
) -> Result<usize> {
    match source {
        Source::File(path) => {
            let file = File::open(path)
                .await
                .map_err(|e| anyhow!("could not open {}: {e}", path.display()))?;
            upload_from(file, channel).await
        }
        Source::Stdin => upload_from(tokio::io::stdin(), channel).await,
    }
}

fn progress_bar(
    size: Option<u64>,
    mut receiver: tokio::sync::mpsc::UnboundedReceiver<usize>,
) -> JoinHandle<()> {
    let bar = size.map_or_else(Bar::new_spinner_stream, Bar::new);

    tokio::spawn(async move {
        while let Some(size) = receiver.recv().await {
            if let Some(pb) = &bar.progress {
                pb.inc(u64::try_from(size).unwrap_or(u64::MAX));
            }
        }

        if let Some(pb) = &bar.progress {
            pb.finish();
        }
    })
}

// a known size must fit in the maximum number of parts
fn check_limits(size: Option<u64>, part_size: usize) -> Result<()> {
    let part_size = u64::try_from(part_size)?;

    if part_size > MAX_PART_SIZE_BYTES {
        return Err(anyhow!(
            "part size limit exceeded: {part_size}, max size: {MAX_PART_SIZE_BYTES}"
        ));
    }

    let Some(size) = size else {
        return Ok(());
    };

    if size > MAX_OBJECT_SIZE_BYTES {
        return Err(anyhow!(
            "object size limit exceeded: {size}, max size: {MAX_OBJECT_SIZE_BYTES}"
        ));
    }

    if size > part_size.saturating_mul(u64::from(MAX_PARTS_PER_UPLOAD)) {
        return Err(anyhow!(
            "{size} bytes need more than {MAX_PARTS_PER_UPLOAD} parts of {part_size} bytes, increase --buffer"
        ));
    }

    Ok(())
}
