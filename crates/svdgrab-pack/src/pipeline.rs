//! Fetch pipeline: index, vendor selection, download and extraction.
//!
//! Matching packs are processed one after another. A pack that fails to
//! download or extract is reported to the listener and skipped; only a
//! failure to obtain the index ends the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::downloader::{DownloadedArchive, PackDownloader, ProgressSnapshot};
use crate::extractor::{SvdExtractor, DEFAULT_MARKER};
use crate::http::HttpClient;
use crate::index::{Index, IndexFetcher, PackageEntry, DEFAULT_INDEX_URL};
use crate::{PackError, Result};

/// What to fetch and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Vendor to select, compared case-insensitively
    pub vendor: String,
    pub destination: PathBuf,
    pub index_url: String,
    /// Only this exact pack version
    pub version: Option<String>,
    /// Only packs whose name contains this text (case-insensitive)
    pub name_filter: Option<String>,
    /// Archive path fragment selecting the entries to extract
    pub marker: String,
    /// Delete each `.pack` file once it has been extracted
    pub remove_archives: bool,
}

impl FetchOptions {
    pub fn new(vendor: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            vendor: vendor.into(),
            destination: destination.into(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            version: None,
            name_filter: None,
            marker: DEFAULT_MARKER.to_string(),
            remove_archives: false,
        }
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_name_filter(mut self, filter: impl Into<String>) -> Self {
        self.name_filter = Some(filter.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_remove_archives(mut self, remove: bool) -> Self {
        self.remove_archives = remove;
        self
    }

    /// Whether `entry` is one of the packs this run should process
    pub fn selects(&self, entry: &PackageEntry) -> bool {
        if !entry.matches_vendor(&self.vendor) || entry.is_deprecated() {
            return false;
        }
        if let Some(version) = &self.version {
            if entry.version != *version {
                return false;
            }
        }
        if let Some(filter) = &self.name_filter {
            if !entry.name.to_lowercase().contains(&filter.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Packs of `index` selected by `options`, in document order
pub fn select_packages<'a>(index: &'a Index, options: &FetchOptions) -> Vec<&'a PackageEntry> {
    index.packages().filter(|entry| options.selects(entry)).collect()
}

/// Receives pipeline progress. Every method defaults to doing nothing.
pub trait FetchListener {
    fn index_fetched(&mut self, _index: &Index, _matched: usize) {}

    fn package_started(&mut self, _entry: &PackageEntry, _url: &str) {}

    fn download_progress(&mut self, _entry: &PackageEntry, _snapshot: ProgressSnapshot) {}

    fn package_downloaded(&mut self, _entry: &PackageEntry, _archive: &DownloadedArchive) {}

    fn download_failed(&mut self, _entry: &PackageEntry, _error: &PackError) {}

    fn file_extracted(&mut self, _entry: &PackageEntry, _path: &Path) {}

    fn extraction_failed(&mut self, _entry: &PackageEntry, _error: &PackError) {}

    fn package_finished(&mut self, _entry: &PackageEntry, _files: usize) {}
}

/// Listener that ignores every event
pub struct SilentListener;

impl FetchListener for SilentListener {}

/// Overall result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every matching pack was downloaded and extracted
    Complete,
    /// The index has no pack for the requested vendor
    NothingMatched,
    /// At least one matching pack failed
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    pub vendor: String,
    pub destination: PathBuf,
    pub matched: usize,
    /// Packs downloaded and extracted successfully
    pub processed: usize,
    pub extracted_files: usize,
    pub download_failures: usize,
    pub extraction_failures: usize,
}

impl FetchReport {
    fn new(options: &FetchOptions, matched: usize) -> Self {
        Self {
            vendor: options.vendor.clone(),
            destination: options.destination.clone(),
            matched,
            processed: 0,
            extracted_files: 0,
            download_failures: 0,
            extraction_failures: 0,
        }
    }

    pub fn outcome(&self) -> FetchOutcome {
        if self.matched == 0 {
            FetchOutcome::NothingMatched
        } else if self.processed == self.matched {
            FetchOutcome::Complete
        } else {
            FetchOutcome::Partial
        }
    }
}

pub struct FetchPipeline {
    fetcher: IndexFetcher,
    downloader: PackDownloader,
}

impl FetchPipeline {
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self {
            fetcher: IndexFetcher::new(Arc::clone(&http_client)),
            downloader: PackDownloader::new(http_client),
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.downloader = self.downloader.with_progress_interval(interval);
        self
    }

    /// Fetch the index and process every selected pack.
    ///
    /// Fails only if the destination cannot be created or the index cannot
    /// be fetched; per-pack failures are counted in the report.
    pub async fn run<L>(&self, options: &FetchOptions, listener: &mut L) -> Result<FetchReport>
    where
        L: FetchListener + ?Sized,
    {
        tokio::fs::create_dir_all(&options.destination).await?;

        let index = self.fetcher.fetch(&options.index_url).await?;
        Ok(self.process(&index, options, listener).await)
    }

    /// Process the packs of an already fetched index
    pub async fn process<L>(&self, index: &Index, options: &FetchOptions, listener: &mut L) -> FetchReport
    where
        L: FetchListener + ?Sized,
    {
        let selected = select_packages(index, options);
        log::info!(
            "{} of {} packs match vendor '{}'",
            selected.len(),
            index.packages().count(),
            options.vendor
        );
        listener.index_fetched(index, selected.len());

        let extractor = SvdExtractor::new(options.marker.clone());
        let mut report = FetchReport::new(options, selected.len());

        for entry in selected {
            listener.package_started(entry, &entry.archive_url());

            let download = self
                .downloader
                .download(entry, &options.destination, |snapshot| listener.download_progress(entry, snapshot))
                .await;

            let archive = match download {
                Ok(archive) => archive,
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.archive_file_name(), e);
                    listener.download_failed(entry, &e);
                    report.download_failures += 1;
                    continue;
                }
            };
            listener.package_downloaded(entry, &archive);

            let extracted = extractor.extract_with(&archive.path, &options.destination, |path| {
                listener.file_extracted(entry, path)
            });

            match extracted {
                Ok(files) => {
                    report.processed += 1;
                    report.extracted_files += files;
                    listener.package_finished(entry, files);

                    if options.remove_archives {
                        if let Err(e) = tokio::fs::remove_file(&archive.path).await {
                            log::warn!("Could not remove {}: {}", archive.path.display(), e);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Extraction of {} stopped: {}", archive.path.display(), e);
                    listener.extraction_failed(entry, &e);
                    report.extraction_failures += 1;
                }
            }
        }

        report
    }
}
