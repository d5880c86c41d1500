//! Progress bars for pack downloads.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use svdgrab_pack::ProgressSnapshot;

const DOWNLOAD_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}";

/// Creates one bar per download
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create a download progress bar; hidden when progress is disabled
    pub fn create_download_bar(&self, name: &str, total: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template(DOWNLOAD_TEMPLATE) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Move a bar to the position of a snapshot
pub fn apply_snapshot(pb: &ProgressBar, snapshot: ProgressSnapshot) {
    if snapshot.total > 0 && pb.length() != Some(snapshot.total) {
        pb.set_length(snapshot.total);
    }
    pb.set_position(snapshot.transferred);
}

/// Helper to format bytes for display
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 / 2), "1.50 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_disabled_manager_hides_bars() {
        let pm = ProgressManager::new(false);
        assert!(pm.create_download_bar("Acme.Widget.1.2.3.pack", 10).is_hidden());
    }

    #[test]
    fn test_apply_snapshot() {
        let pb = ProgressBar::hidden();
        apply_snapshot(&pb, ProgressSnapshot { transferred: 40, total: 100 });
        assert_eq!(pb.position(), 40);
        assert_eq!(pb.length(), Some(100));
    }
}
