//! Import failure taxonomy

use std::path::PathBuf;

use thiserror::Error;

/// A scene file could not be loaded.
///
/// Every variant is fatal to the load operation and non-retryable: the caller
/// gets no partial scene and decides whether to abort or substitute a
/// fallback. Loading never fails *after* parsing succeeds; attribute gaps and
/// malformed polygons inside a valid document are handled downstream with
/// defaults instead of errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension names a format this importer does not understand.
    #[error("unsupported scene format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// The file is missing or unreadable.
    #[error("failed to open scene file: {path}")]
    OpenFailed { path: PathBuf },

    /// The file was read but its content is not a valid scene document.
    #[error("failed to parse scene file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}
