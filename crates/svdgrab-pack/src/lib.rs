//! CMSIS pack index client.
//!
//! Reads a pack index (`index.pidx`), builds a catalog of vendors and their
//! pack versions, and downloads the packs of one vendor to extract the SVD
//! device description files they bundle.

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod http;
pub mod index;
pub mod pipeline;

pub use catalog::VendorCatalog;
pub use downloader::{DownloadedArchive, PackDownloader, ProgressSnapshot};
pub use error::{PackError, Result};
pub use extractor::{SvdExtractor, DEFAULT_MARKER};
pub use http::{HttpClient, HttpClientConfig};
pub use index::{Index, IndexFetcher, PackageEntry, DEFAULT_INDEX_URL};
pub use pipeline::{
    select_packages, FetchListener, FetchOptions, FetchOutcome, FetchPipeline, FetchReport, SilentListener,
};
