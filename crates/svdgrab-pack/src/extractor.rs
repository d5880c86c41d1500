//! Extraction of SVD files from pack archives.
//!
//! A pack is a zip container. Only entries whose archive path contains the
//! filter marker are written; every destination path is checked lexically
//! against the destination directory before anything touches the disk.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::{PackError, Result};

/// Archive path fragment that marks SVD content in CMSIS packs
pub const DEFAULT_MARKER: &str = "SVD";

/// Extracts marker-matching entries from pack archives
#[derive(Debug, Clone)]
pub struct SvdExtractor {
    marker: String,
}

impl SvdExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extract into `dest_dir`, returning the number of files written
    pub fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<usize> {
        self.extract_with(archive_path, dest_dir, |_| {})
    }

    /// Like [`extract`](Self::extract), calling `on_file` after each file is written.
    ///
    /// The first entry that would land outside `dest_dir` aborts the
    /// extraction with [`PackError::PathTraversal`]. Files written before
    /// that point stay on disk.
    pub fn extract_with<F>(&self, archive_path: &Path, dest_dir: &Path, mut on_file: F) -> Result<usize>
    where
        F: FnMut(&Path),
    {
        let corrupt = |source| PackError::CorruptArchive {
            path: archive_path.to_path_buf(),
            source,
        };

        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(corrupt)?;

        fs::create_dir_all(dest_dir)?;
        let root = normalize_path(&std::path::absolute(dest_dir)?);

        let mut written = 0;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(corrupt)?;
            let name = entry.name().to_string();

            if !name.contains(&self.marker) {
                log::trace!("Skipping {}", name);
                continue;
            }

            let Some(outpath) = contained_path(&root, &name) else {
                log::warn!("Rejecting {} in {}: outside {}", name, archive_path.display(), root.display());
                return Err(PackError::PathTraversal { entry: name });
            };

            if entry.is_dir() {
                fs::create_dir_all(&outpath)?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }

            {
                let mut outfile = File::create(&outpath)?;
                io::copy(&mut entry, &mut outfile)?;
            }

            // Keep stored permission bits, but stay owner-writable so reruns can overwrite
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode((mode & 0o777) | 0o600))?;
                }
            }

            log::debug!("Extracted {}", outpath.display());
            on_file(&outpath);
            written += 1;
        }

        Ok(written)
    }
}

impl Default for SvdExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Resolve `.` and `..` components without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Destination of `name` under `root`, or `None` if it is not strictly inside
fn contained_path(root: &Path, name: &str) -> Option<PathBuf> {
    let candidate = normalize_path(&root.join(name));
    (candidate != root && candidate.starts_with(root)).then_some(candidate)
}
