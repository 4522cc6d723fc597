use std::{io, path::PathBuf};

use graphhds_core::GraphHdsError;
use thiserror::Error;

/// Errors raised while reading graph input or writing artifacts.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum JsonlProviderError {
    /// A file could not be opened or created.
    #[error("failed to access `{path}`: {source}")]
    Open {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Reading or writing a stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A graph line was not a valid adjacency record.
    #[error("line {line} is not a valid graph record: {source}")]
    Record {
        /// One-based line number.
        line: usize,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// A mapping row did not have exactly three tab-separated columns.
    #[error("mapping line {line} has {found} columns, expected <node id>\\t<original id>\\t<raw weight>")]
    MappingColumns {
        /// One-based line number.
        line: usize,
        /// Number of columns found.
        found: usize,
    },
    /// A mapping column could not be parsed.
    #[error("mapping line {line} has invalid {field} `{value}`")]
    MappingField {
        /// One-based line number.
        line: usize,
        /// Column name.
        field: &'static str,
        /// Raw column text.
        value: String,
    },
    /// Serialising an artifact record failed.
    #[error("failed to encode artifact record: {0}")]
    Encode(#[source] serde_json::Error),
    /// The core rejected the assembled graph.
    #[error(transparent)]
    Core(#[from] GraphHdsError),
}

impl JsonlProviderError {
    /// The wrapped core error, when the failure came from graph assembly.
    #[must_use]
    pub const fn core_error(&self) -> Option<&GraphHdsError> {
        match self {
            Self::Core(error) => Some(error),
            _ => None,
        }
    }
}
