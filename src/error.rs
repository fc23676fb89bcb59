use std::path::PathBuf;

/// Failures that abort the setup run
///
/// Everything else (plain I/O, unreadable directories) goes through anyhow
/// with added context; these are the conditions a user is expected to fix
/// in their configuration or working directory.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Required field '{field}' not found in {}", path.display())]
    MissingConfigField { field: String, path: PathBuf },

    #[error("Could not read STAR index parameters - double check that '{}' exists", path.display())]
    IndexPathMismatch { path: PathBuf },

    #[error("STAR version installed: {installed} is not the same STAR version used to build the STAR index directory: {index}")]
    VersionMismatch { installed: String, index: String },

    #[error("Cannot move {} to {}: destination already exists", file.display(), dest.display())]
    DestinationExists { file: PathBuf, dest: PathBuf },
}
