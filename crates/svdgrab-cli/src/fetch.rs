//! Fetch command - download the packs of one vendor and extract their SVD files.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::ProgressBar;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use svdgrab_pack::{
    DownloadedArchive, FetchListener, FetchOptions, FetchOutcome, FetchPipeline, FetchReport, HttpClient, Index,
    PackError, PackageEntry, ProgressSnapshot, DEFAULT_INDEX_URL, DEFAULT_MARKER,
};

use crate::config::SvdgrabConfig;
use crate::output::Output;
use crate::progress::{apply_snapshot, format_bytes, ProgressManager};

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Vendor whose packs to fetch (case-insensitive)
    #[arg(long)]
    pub vendor: String,

    /// Destination directory [default: .]
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Pack index URL
    #[arg(long)]
    pub index: Option<String>,

    /// Only fetch this pack version
    #[arg(long = "pack", value_name = "VERSION")]
    pub version: Option<String>,

    /// Only fetch packs whose name contains this text (case-insensitive)
    #[arg(long = "match", value_name = "PART")]
    pub name_filter: Option<String>,

    /// Extract only archive entries whose path contains this text [default: SVD]
    #[arg(long)]
    pub marker: Option<String>,

    /// Delete each .pack archive once it has been extracted
    #[arg(long)]
    pub remove_archives: bool,
}

impl FetchArgs {
    /// Merge flags over the resolved configuration
    fn options(self, config: &SvdgrabConfig) -> FetchOptions {
        let destination = self
            .path
            .or_else(|| config.path.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let index_url = self
            .index
            .or_else(|| config.index.clone())
            .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string());
        let marker = self
            .marker
            .or_else(|| config.marker.clone())
            .unwrap_or_else(|| DEFAULT_MARKER.to_string());

        let mut options = FetchOptions::new(self.vendor, destination)
            .with_index_url(index_url)
            .with_marker(marker)
            .with_remove_archives(self.remove_archives);
        if let Some(version) = self.version {
            options = options.with_version(version);
        }
        if let Some(filter) = self.name_filter {
            options = options.with_name_filter(filter);
        }
        options
    }
}

pub async fn execute(args: FetchArgs, config: &SvdgrabConfig, output: &Output) -> Result<i32> {
    let options = args.options(config);

    tokio::fs::create_dir_all(&options.destination)
        .await
        .with_context(|| format!("Failed to create destination directory {}", options.destination.display()))?;

    let http_client = HttpClient::with_config(config.http_client_config())
        .context("Failed to create HTTP client")?;
    let pipeline = FetchPipeline::new(Arc::new(http_client));

    output.verbose(&format!("Reading pack index from {}", options.index_url));

    let mut listener = ConsoleListener::new(output, &options.vendor);
    let result = pipeline.run(&options, &mut listener).await;
    listener.clear_bar();

    match result {
        Ok(report) => {
            if report.outcome() == FetchOutcome::NothingMatched {
                output.warning(&format!("No packs found for vendor {}", report.vendor));
            }
            print_summary(output, &report, &options.marker);
            Ok(exit_code(report.outcome()))
        }
        Err(e) => {
            output.error(&describe_failure(&e, &options));
            let mut source = e.source();
            while let Some(cause) = source {
                output.error(&format!("  Caused by: {}", cause));
                source = cause.source();
            }

            let report = FetchReport {
                vendor: options.vendor.clone(),
                destination: options.destination.clone(),
                matched: 0,
                processed: 0,
                extracted_files: 0,
                download_failures: 0,
                extraction_failures: 0,
            };
            print_summary(output, &report, &options.marker);
            Ok(1)
        }
    }
}

/// Headline for an error that stopped the run
fn describe_failure(error: &PackError, options: &FetchOptions) -> String {
    match error {
        PackError::Io(e) => format!("Failed to write to {}: {}", options.destination.display(), e),
        other => format!("Failed to fetch packs from {}: {}", options.index_url, other),
    }
}

/// 0 complete, 2 nothing matched, 3 some packs failed
fn exit_code(outcome: FetchOutcome) -> i32 {
    match outcome {
        FetchOutcome::Complete => 0,
        FetchOutcome::NothingMatched => 2,
        FetchOutcome::Partial => 3,
    }
}

fn print_summary(output: &Output, report: &FetchReport, marker: &str) {
    let folder = report.destination.join(marker);
    let message = format!(
        "Done, {} of {} packs from vendor {} stored in folder [{}] ({} files extracted).",
        report.processed,
        report.matched,
        style(&report.vendor).cyan(),
        style(folder.display()).cyan(),
        report.extracted_files
    );

    if report.outcome() == FetchOutcome::Complete {
        output.success(&message);
    } else {
        output.writeln(&message);
    }
}

/// Renders pipeline events as console lines and a download bar
struct ConsoleListener<'a> {
    output: &'a Output,
    vendor: String,
    progress: ProgressManager,
    bar: Option<ProgressBar>,
}

impl<'a> ConsoleListener<'a> {
    fn new(output: &'a Output, vendor: &str) -> Self {
        Self {
            output,
            vendor: vendor.to_string(),
            progress: ProgressManager::new(output.wants_progress()),
            bar: None,
        }
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl FetchListener for ConsoleListener<'_> {
    fn index_fetched(&mut self, index: &Index, matched: usize) {
        self.output.info(&format!(
            "Index of {} lists {} packs, {} from vendor {}",
            index.vendor,
            index.packages().count(),
            matched,
            self.vendor
        ));
    }

    fn package_started(&mut self, entry: &PackageEntry, url: &str) {
        self.output.info(&format!("Downloading {}...", url));
        self.bar = Some(
            self.progress
                .create_download_bar(&entry.archive_file_name(), entry.size.unwrap_or(0)),
        );
    }

    fn download_progress(&mut self, _entry: &PackageEntry, snapshot: ProgressSnapshot) {
        if let Some(bar) = &self.bar {
            apply_snapshot(bar, snapshot);
        }
    }

    fn package_downloaded(&mut self, _entry: &PackageEntry, archive: &DownloadedArchive) {
        self.clear_bar();
        self.output.verbose(&format!("HTTP status: {}", archive.status));
        self.output.list_item(
            "saved",
            &format!("{} ({})", archive.path.display(), format_bytes(archive.bytes)),
        );
    }

    fn download_failed(&mut self, entry: &PackageEntry, error: &PackError) {
        self.clear_bar();
        self.output
            .warning(&format!("Skipping {}: {}", entry.archive_file_name(), error));
    }

    fn file_extracted(&mut self, _entry: &PackageEntry, path: &Path) {
        self.output
            .verbose(&format!("    extracting {}", path.display()));
    }

    fn extraction_failed(&mut self, entry: &PackageEntry, error: &PackError) {
        self.output
            .warning(&format!("Extraction of {} stopped: {}", entry.archive_file_name(), error));
    }

    fn package_finished(&mut self, entry: &PackageEntry, files: usize) {
        self.output.list_item(
            "unzipped",
            &format!("{} ({} files)", entry.archive_file_name(), files),
        );
    }
}
