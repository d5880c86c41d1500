//! Pack downloading.
//!
//! Streams `.pack` archives from the URL advertised in the index to a local
//! directory and reports transfer progress while it runs.

mod pack;
mod progress;

pub use pack::{DownloadedArchive, PackDownloader, PROGRESS_INTERVAL};
pub use progress::{ProgressSnapshot, TransferProgress};
