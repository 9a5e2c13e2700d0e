//! Checkpoint persistence for model weights.

use std::path::Path;

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{
    BinFileRecorder, FullPrecisionSettings, NamedMpkFileRecorder, PrettyJsonFileRecorder, Recorder,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, Result};

/// Supported checkpoint file formats.
///
/// # Example
///
/// ```
/// use facenet_model::CheckpointFormat;
///
/// let format = CheckpointFormat::from_extension("bin");
/// assert_eq!(format, Some(CheckpointFormat::Binary));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckpointFormat {
    /// Binary format - compact and fast.
    ///
    /// Uses Burn's `BinFileRecorder` with full precision.
    /// Recommended for production deployments.
    #[default]
    Binary,

    /// Named MessagePack format.
    ///
    /// Uses Burn's `NamedMpkFileRecorder`. Keeps parameter names, so
    /// checkpoints survive field reordering.
    NamedMpk,

    /// JSON format - human-readable.
    ///
    /// Uses Burn's `PrettyJsonFileRecorder` for debugging
    /// and inspection. Larger file size but portable.
    Json,
}

impl CheckpointFormat {
    /// Determines format from file extension.
    ///
    /// - `.bin`, `.burn` -> Binary
    /// - `.mpk` -> NamedMpk
    /// - `.json` -> Json
    /// - Other -> None
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bin" | "burn" => Some(Self::Binary),
            "mpk" => Some(Self::NamedMpk),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Determines format from file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the default file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::NamedMpk => "mpk",
            Self::Json => "json",
        }
    }

    /// Returns the format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::NamedMpk => "named-mpk",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for CheckpointFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Saves a model checkpoint to a file.
///
/// # Arguments
///
/// - `model`: The model to save
/// - `path`: Output file path (without extension)
/// - `format`: Checkpoint format to use
///
/// # Returns
///
/// The full path to the saved checkpoint (with extension added).
///
/// # Errors
///
/// Returns `ModelError::SaveCheckpoint` if saving fails.
///
/// # Example
///
/// ```ignore
/// use facenet_model::{save_checkpoint, CheckpointFormat};
///
/// let path = save_checkpoint(&model, "facenet", CheckpointFormat::Binary)?;
/// ```
pub fn save_checkpoint<B, M>(model: &M, path: &str, format: CheckpointFormat) -> Result<String>
where
    B: Backend,
    M: Module<B>,
{
    let full_path = format!("{}.{}", path, format.extension());
    let record = model.clone().into_record();

    match format {
        CheckpointFormat::Binary => {
            let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
            recorder
                .record(record, full_path.clone().into())
                .map_err(|e| ModelError::save_checkpoint(&full_path, e.to_string()))?;
        }
        CheckpointFormat::NamedMpk => {
            let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
            recorder
                .record(record, full_path.clone().into())
                .map_err(|e| ModelError::save_checkpoint(&full_path, e.to_string()))?;
        }
        CheckpointFormat::Json => {
            let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
            recorder
                .record(record, full_path.clone().into())
                .map_err(|e| ModelError::save_checkpoint(&full_path, e.to_string()))?;
        }
    }

    debug!(path = %full_path, format = format.name(), "saved checkpoint");
    Ok(full_path)
}

/// Loads a model checkpoint from a file.
///
/// # Arguments
///
/// - `model`: The model to load weights into
/// - `path`: Path to the checkpoint file (with extension)
/// - `device`: Device to load the model onto
///
/// # Returns
///
/// The model with loaded weights.
///
/// # Errors
///
/// Returns `ModelError::LoadCheckpoint` if loading fails.
/// Returns `ModelError::CheckpointNotFound` if the file doesn't exist.
/// Returns `ModelError::UnsupportedFormat` if the format can't be determined.
///
/// # Example
///
/// ```ignore
/// use facenet_model::{load_checkpoint, InceptionResnetV1, InceptionResnetV1Config};
///
/// let config = InceptionResnetV1Config::new();
/// let model = InceptionResnetV1::<MyBackend>::new(config, &device);
/// let model = load_checkpoint(model, "facenet.bin", &device)?;
/// ```
pub fn load_checkpoint<B, M>(model: M, path: &str, device: &B::Device) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(ModelError::checkpoint_not_found(path));
    }

    let format = CheckpointFormat::from_path(path_obj)
        .ok_or_else(|| ModelError::unsupported_format(path))?;

    let loaded = match format {
        CheckpointFormat::Binary => {
            let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
            model
                .load_file(path_obj, &recorder, device)
                .map_err(|e| ModelError::load_checkpoint(path, e.to_string()))?
        }
        CheckpointFormat::NamedMpk => {
            let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
            model
                .load_file(path_obj, &recorder, device)
                .map_err(|e| ModelError::load_checkpoint(path, e.to_string()))?
        }
        CheckpointFormat::Json => {
            let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
            model
                .load_file(path_obj, &recorder, device)
                .map_err(|e| ModelError::load_checkpoint(path, e.to_string()))?
        }
    };

    debug!(path, format = format.name(), "loaded checkpoint");
    Ok(loaded)
}
