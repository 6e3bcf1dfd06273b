//! Error types for the discovery pipeline and the prompt template

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failure; no partial file list is ever returned alongside it
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read ignore file {}: {source}", path.display())]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to traverse {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Malformed prompt template
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed block `{{{{#{0}}}}}`")]
    UnclosedBlock(String),

    #[error("unexpected `{{{{/{0}}}}}` with no open block")]
    UnexpectedClose(String),

    #[error("`{{{{/{found}}}}}` does not close `{{{{#{open}}}}}`")]
    MismatchedClose { open: String, found: String },

    #[error("unsupported block helper `{0}`")]
    UnsupportedBlock(String),

    #[error("unknown collection `{0}` (only `files` can be iterated)")]
    UnknownCollection(String),

    #[error("unknown helper `{0}`")]
    UnknownHelper(String),
}
