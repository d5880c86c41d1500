//! Pack index model and retrieval.

mod fetch;
mod model;

pub use fetch::{validate_index_url, IndexFetcher, DEFAULT_INDEX_URL};
pub use model::{Index, PackageEntry, PackageGroup, VendorEntry, VendorGroup};
