//! Error types for prop extraction.
//!
//! Every variant is local to one entry module: the batch driver records it
//! against that module and moves on to the next one.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure while resolving a module's prop surface
#[derive(Debug, Error)]
pub enum ApiError {
    /// No path variant of a requested module exists on disk.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// None of the supported export idioms matched.
    #[error("no recognized component export in {path}")]
    ExportNotFound { path: PathBuf },

    /// The prop type is neither declared locally nor importable in one hop.
    #[error("type definition `{name}` not found from {path}")]
    TypeNotFound { path: PathBuf, name: String },

    /// The default export is re-exported more than one module deep.
    #[error("re-export chain from {path} is longer than one hop")]
    UnsupportedExportChain { path: PathBuf },

    /// The parser rejected the source text.
    #[error("failed to parse {path} at {line}:{column}")]
    ParseError {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    /// A type was reached again while it was still being resolved.
    #[error("cyclic type reference `{name}` in {path}")]
    CyclicReference { path: PathBuf, name: String },

    /// The module exists but could not be read.
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::FileNotFound { .. } => FailureKind::FileNotFound,
            ApiError::ExportNotFound { .. } => FailureKind::ExportNotFound,
            ApiError::TypeNotFound { .. } => FailureKind::TypeNotFound,
            ApiError::UnsupportedExportChain { .. } => FailureKind::UnsupportedExportChain,
            ApiError::ParseError { .. } => FailureKind::ParseError,
            ApiError::CyclicReference { .. } => FailureKind::CyclicReference,
            ApiError::Io { .. } => FailureKind::Io,
        }
    }
}

/// Stable tag for an [`ApiError`], used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    FileNotFound,
    ExportNotFound,
    TypeNotFound,
    UnsupportedExportChain,
    ParseError,
    CyclicReference,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::FileNotFound => write!(f, "file_not_found"),
            FailureKind::ExportNotFound => write!(f, "export_not_found"),
            FailureKind::TypeNotFound => write!(f, "type_not_found"),
            FailureKind::UnsupportedExportChain => write!(f, "unsupported_export_chain"),
            FailureKind::ParseError => write!(f, "parse_error"),
            FailureKind::CyclicReference => write!(f, "cyclic_reference"),
            FailureKind::Io => write!(f, "io"),
        }
    }
}
