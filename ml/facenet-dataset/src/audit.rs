//! Recursive decode audit over an image directory tree.
//!
//! The audit walks a directory, attempts to decode every file whose
//! extension is in the configured set, and tallies failures without
//! stopping. It answers "how much of this dataset is actually readable"
//! before any training time is spent on it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{DatasetError, Result};
use crate::formats::ImageFormats;
use crate::report::{AuditReport, DecodeFailure};

/// Default number of scanned files between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5000;

/// Configuration for [`audit_images`].
///
/// # Example
///
/// ```
/// use facenet_dataset::{AuditConfig, ImageFormats};
///
/// let config = AuditConfig::new()
///     .with_formats(ImageFormats::from_extensions(["png"]))
///     .with_progress_interval(1000);
///
/// assert_eq!(config.progress_interval, 1000);
/// assert!(!config.follow_links);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Extensions attempted for decoding.
    pub formats: ImageFormats,

    /// Scanned-file count between progress log lines. Zero disables
    /// progress logging.
    pub progress_interval: usize,

    /// Whether to follow symbolic links during the walk.
    pub follow_links: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: ImageFormats::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            follow_links: false,
        }
    }

    /// Sets the format set.
    #[must_use]
    pub fn with_formats(mut self, formats: ImageFormats) -> Self {
        self.formats = formats;
        self
    }

    /// Sets the progress interval.
    #[must_use]
    pub const fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// Sets whether to follow symbolic links.
    #[must_use]
    pub const fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}

/// Walks `root` recursively and attempts to decode every image file found.
///
/// Files whose extension is outside the configured set are counted as
/// skipped without a decode attempt. A file that fails to decode is logged,
/// recorded in the report, and the walk continues; one corrupt file never
/// aborts the audit. A progress line is logged every
/// `config.progress_interval` scanned files.
///
/// # Arguments
///
/// - `root`: Directory to walk
/// - `config`: Format set and walk options
///
/// # Returns
///
/// The [`AuditReport`] with scan counts and per-file failures.
///
/// # Errors
///
/// Returns `DatasetError::RootNotFound` if `root` does not exist, and
/// `DatasetError::NotADirectory` if it exists but is not a directory.
pub fn audit_images(root: &Path, config: &AuditConfig) -> Result<AuditReport> {
    if !root.exists() {
        return Err(DatasetError::root_not_found(root.display().to_string()));
    }
    if !root.is_dir() {
        return Err(DatasetError::not_a_directory(root.display().to_string()));
    }

    info!(root = %root.display(), "starting image audit");

    let mut report = AuditReport::new();
    for entry in WalkDir::new(root).follow_links(config.follow_links) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                report.walk_errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !config.formats.matches(path) {
            debug!(path = %path.display(), "skipping non-image file");
            report.skipped += 1;
            continue;
        }

        report.scanned += 1;
        if let Err(e) = image::open(path) {
            warn!(path = %path.display(), error = %e, "failed to decode image");
            report.record_failure(DecodeFailure::new(path, e.to_string()));
        }

        if config.progress_interval > 0 && report.scanned % config.progress_interval == 0 {
            info!(
                scanned = report.scanned,
                failures = report.error_count(),
                "audit progress"
            );
        }
    }

    info!(
        scanned = report.scanned,
        failures = report.error_count(),
        skipped = report.skipped,
        walk_errors = report.walk_errors,
        "audit complete"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(path: &Path) {
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(3, 3, Rgb([0, 0, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn config_defaults() {
        let config = AuditConfig::new();
        assert_eq!(config.formats, ImageFormats::new());
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
        assert!(!config.follow_links);
        assert_eq!(AuditConfig::default(), config);
    }

    #[test]
    fn config_builders() {
        let config = AuditConfig::new()
            .with_formats(ImageFormats::from_extensions(["png"]))
            .with_progress_interval(100)
            .with_follow_links(true);

        assert_eq!(config.formats.extensions(), ["png"]);
        assert_eq!(config.progress_interval, 100);
        assert!(config.follow_links);
    }

    #[test]
    fn config_serialization() {
        let config = AuditConfig::new().with_progress_interval(42);
        let json = serde_json::to_string(&config);
        assert!(json.is_ok());

        let parsed: std::result::Result<AuditConfig, _> =
            serde_json::from_str(&json.unwrap_or_default());
        assert_eq!(parsed.ok(), Some(config));
    }

    #[test]
    fn audit_counts_valid_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        write_image(&dir.path().join("a.png"));
        write_image(&dir.path().join("b.jpg"));
        write_image(&dir.path().join("c.bmp"));
        std::fs::write(dir.path().join("d.jpg"), b"not an image at all").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let report = audit_images(dir.path(), &AuditConfig::new()).unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.walk_errors, 0);
        assert!(!report.is_clean());
        assert!(report.failures[0].path.ends_with("d.jpg"));
    }

    #[test]
    fn audit_missing_root() {
        let result = audit_images(Path::new("/nonexistent/images"), &AuditConfig::new());
        assert!(matches!(result, Err(DatasetError::RootNotFound(_))));
    }

    #[test]
    fn audit_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.png");
        write_image(&file);

        let result = audit_images(&file, &AuditConfig::new());
        assert!(matches!(result, Err(DatasetError::NotADirectory(_))));
    }

    #[test]
    fn audit_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = audit_images(dir.path(), &AuditConfig::new()).unwrap();

        assert_eq!(report.scanned, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn audit_recurses_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("people").join("train");
        std::fs::create_dir_all(&nested).unwrap();
        write_image(&dir.path().join("top.png"));
        write_image(&nested.join("deep.png"));

        let report = audit_images(dir.path(), &AuditConfig::new()).unwrap();
        assert_eq!(report.scanned, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn audit_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.save_with_format(dir.path().join("SHOUT.PNG"), image::ImageFormat::Png)
            .unwrap();

        let report = audit_images(dir.path(), &AuditConfig::new()).unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.error_count(), 0);
    }

    #[test]
    fn audit_extension_content_mismatch_fails_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.bmp");
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([9, 9, 9]));
        // PNG bytes behind a .bmp extension
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let report = audit_images(dir.path(), &AuditConfig::new()).unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn audit_custom_formats() {
        let dir = tempfile::tempdir().unwrap();
        write_image(&dir.path().join("keep.png"));
        write_image(&dir.path().join("ignore.jpg"));

        let config = AuditConfig::new().with_formats(ImageFormats::from_extensions(["png"]));
        let report = audit_images(dir.path(), &config).unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn audit_zero_progress_interval() {
        let dir = tempfile::tempdir().unwrap();
        write_image(&dir.path().join("a.png"));
        write_image(&dir.path().join("b.png"));
        write_image(&dir.path().join("c.png"));

        let config = AuditConfig::new().with_progress_interval(0);
        let report = audit_images(dir.path(), &config).unwrap();
        assert_eq!(report.scanned, 3);

        // Small nonzero interval exercises the progress branch.
        let config = AuditConfig::new().with_progress_interval(2);
        let report = audit_images(dir.path(), &config).unwrap();
        assert_eq!(report.scanned, 3);
    }
}
