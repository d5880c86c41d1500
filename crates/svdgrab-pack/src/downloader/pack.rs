//! Pack archive downloader.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::http::HttpClient;
use crate::index::PackageEntry;
use crate::Result;

use super::progress::{ProgressSnapshot, TransferProgress};

/// How often the observer of a running download is given a snapshot
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// A pack archive stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    pub url: String,
    pub status: u16,
    pub bytes: u64,
}

/// Downloads `.pack` archives described by index entries
pub struct PackDownloader {
    http_client: Arc<HttpClient>,
    progress_interval: Duration,
}

impl PackDownloader {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self {
            http_client,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Download the archive of `entry` into `dest_dir`.
    ///
    /// `on_progress` is called every progress interval while the transfer
    /// runs. The interval lives only as long as this call: once the transfer
    /// resolves, no further snapshot is delivered.
    pub async fn download<F>(&self, entry: &PackageEntry, dest_dir: &Path, mut on_progress: F) -> Result<DownloadedArchive>
    where
        F: FnMut(ProgressSnapshot),
    {
        tokio::fs::create_dir_all(dest_dir).await?;

        let url = entry.archive_url();
        let path = dest_dir.join(entry.archive_file_name());
        let progress = TransferProgress::new(entry.size.unwrap_or(0));

        log::debug!("Downloading {} to {}", url, path.display());

        // The transfer borrows `url` and `path`; it and the ticker end with this block
        let status = {
            let transfer = self.http_client.download(&url, &path, &progress);
            tokio::pin!(transfer);

            let mut ticker = tokio::time::interval_at(Instant::now() + self.progress_interval, self.progress_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    result = &mut transfer => break result?,
                    _ = ticker.tick() => {
                        let snapshot = progress.snapshot();
                        log::trace!("{}: {}", entry.archive_file_name(), snapshot);
                        on_progress(snapshot);
                    }
                }
            }
        };

        Ok(DownloadedArchive {
            path,
            url,
            status,
            bytes: progress.snapshot().transferred,
        })
    }
}
