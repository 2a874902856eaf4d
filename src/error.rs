//! Build errors and the path-context wrapper.
//!
//! The content factory and metadata decoder report failures without knowing
//! where the bundle sits in the tree. The walker is the one place that knows
//! the bundle's path relative to the content root, so it passes every unit
//! failure through [`wrap`] before surfacing it:
//!
//! | Unit failure | Becomes |
//! |---|---|
//! | main file unreadable | [`BuildError::FileIo`] |
//! | metadata decoding failed | [`BuildError::Content`] (keeps `value_found`) |
//! | anything else (asset copy) | passed through unchanged |

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::factory::FactoryError;
use crate::metadata::DecodeError;
use crate::types::ContentPath;
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{reason} at '{path}'")]
    FileIo {
        path: ContentPath,
        reason: FileIoReason,
        #[source]
        source: io::Error,
    },
    #[error("content error at '{path}': {reason}")]
    Content {
        path: ContentPath,
        reason: ContentErrorReason,
    },
    #[error("items in sections '{first}' and '{second}' both resolve to path '{path}'")]
    DuplicateItemPath {
        path: ContentPath,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read content folder: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BuildError {
    /// Path of the offending bundle, for path-contextualized errors.
    pub fn path(&self) -> Option<&ContentPath> {
        match self {
            BuildError::FileIo { path, .. }
            | BuildError::Content { path, .. }
            | BuildError::DuplicateItemPath { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIoReason {
    FileCouldNotBeRead,
}

impl fmt::Display for FileIoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileIoReason::FileCouldNotBeRead => f.write_str("file could not be read"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentErrorReason {
    /// Front-matter decoding failed. `value_found` is false when the field
    /// was missing and true when it was present with an unusable value.
    MetadataDecodingFailed {
        error: DecodeError,
        value_found: bool,
    },
}

impl fmt::Display for ContentErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentErrorReason::MetadataDecodingFailed { error, .. } => {
                write!(f, "metadata decoding failed: {error}")
            }
        }
    }
}

/// A failure inside one concurrent walker unit, before path context is known.
#[derive(Debug)]
pub enum UnitError {
    Read(io::Error),
    Decode(DecodeError),
    Asset(AssetError),
}

impl From<FactoryError> for UnitError {
    fn from(error: FactoryError) -> Self {
        match error {
            FactoryError::Io(e) => UnitError::Read(e),
            FactoryError::Decode(e) => UnitError::Decode(e),
        }
    }
}

impl From<AssetError> for UnitError {
    fn from(error: AssetError) -> Self {
        UnitError::Asset(error)
    }
}

/// Attach the bundle's root-relative `path` to a unit failure.
pub fn wrap(error: impl Into<UnitError>, path: &ContentPath) -> BuildError {
    match error.into() {
        UnitError::Read(source) => BuildError::FileIo {
            path: path.clone(),
            reason: FileIoReason::FileCouldNotBeRead,
            source,
        },
        UnitError::Decode(error) => {
            let value_found = error.value_found();
            BuildError::Content {
                path: path.clone(),
                reason: ContentErrorReason::MetadataDecodingFailed { error, value_found },
            }
        }
        UnitError::Asset(error) => BuildError::Asset(error),
    }
}
