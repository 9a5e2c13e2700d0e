//! Image dataset integrity auditing for FaceForge.
//!
//! Face embedding training consumes directory trees of images collected from
//! many sources, and a single corrupt file can waste a long training run.
//! This crate walks such trees and verifies that every image actually
//! decodes:
//!
//! # Audit Operations
//!
//! - [`audit_images`] - Walk a directory and decode-check every image
//! - [`AuditConfig`] - Format set, progress interval, and walk options
//! - [`AuditReport`] - Scan counts and per-file decode failures
//! - [`ImageFormats`] - Extension set selecting which files are attempted
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use facenet_dataset::{AuditConfig, ImageFormats};
//!
//! let config = AuditConfig::new()
//!     .with_formats(ImageFormats::from_extensions(["png", "jpg"]))
//!     .with_progress_interval(1000);
//!
//! assert!(config.formats.matches(Path::new("face_001.png")));
//! assert!(!config.formats.matches(Path::new("labels.csv")));
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards per [STANDARDS.md](../../STANDARDS.md):
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod audit;
mod error;
mod formats;
mod report;

// Re-export audit operations
pub use audit::{AuditConfig, DEFAULT_PROGRESS_INTERVAL, audit_images};

// Re-export format types
pub use formats::{DEFAULT_EXTENSIONS, ImageFormats};

// Re-export report types
pub use report::{AuditReport, DecodeFailure};

// Re-export error types
pub use error::{DatasetError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        AuditConfig, AuditReport, DatasetError, DecodeFailure, ImageFormats, audit_images,
    };
}
