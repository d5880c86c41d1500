//! HTTP access for the pack index and pack archives.

mod client;

pub use client::{HttpClient, HttpClientConfig};
