use std::path::PathBuf;

use thiserror::Error;

use crate::field::FieldType;
use crate::tree::StreamPosition;

/// Every failure a read can end with.
///
/// Source-access variants (`FileNotFound`, `NotARegularFile`, `Io`, `Stream`)
/// are reported before any parsing happens. The rest carry a message chain
/// such as `Node 'b': Parameter 'x' is missing.` and, when known, the
/// position of the offending entry, rendered as a `[line:L, column:C] `
/// prefix.
#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Config file {} doesn't exist", .0.display())]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::file_not_found)))]
    FileNotFound(PathBuf),

    #[error("Can't open config file {} which is not a regular file", .0.display())]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::not_a_regular_file)))]
    NotARegularFile(PathBuf),

    #[error("Can't open config file {} for reading: {source}", path.display())]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::io)))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Can't read config stream: {0}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::stream)))]
    Stream(#[source] std::io::Error),

    #[error("{}", positioned(.message, .position))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::parse)))]
    Parse {
        message: String,
        position: Option<StreamPosition>,
    },

    #[error("{}", positioned(.message, .position))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::load)))]
    Load {
        message: String,
        position: Option<StreamPosition>,
    },

    #[error("{}", positioned(.message, .position))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(figbind::validation)))]
    Validation {
        message: String,
        position: Option<StreamPosition>,
    },

    #[error("Expected a single element root of the document, use 'read_list*' methods instead")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(figbind::root_shape), help("call ConfigReader::read_list or read_list_file"))
    )]
    RootShape,
}

fn positioned(message: &str, position: &Option<StreamPosition>) -> String {
    match position {
        Some(position) => format!("{position} {message}"),
        None => message.to_string(),
    }
}

impl ConfigError {
    /// A parser failure. Parser implementations use this to report syntax errors.
    pub fn parse(message: impl Into<String>, position: impl Into<Option<StreamPosition>>) -> Self {
        ConfigError::Parse {
            message: message.into(),
            position: position.into(),
        }
    }

    /// The error returned for a tree entry that no declared field matches.
    pub fn unknown_field(kind: FieldType, name: &str, position: StreamPosition) -> Self {
        ConfigError::load(format!("Unknown {kind} '{name}'"), position)
    }

    pub(crate) fn load(message: impl Into<String>, position: impl Into<Option<StreamPosition>>) -> Self {
        ConfigError::Load {
            message: message.into(),
            position: position.into(),
        }
    }

    pub(crate) fn validation(
        message: impl Into<String>,
        position: impl Into<Option<StreamPosition>>,
    ) -> Self {
        ConfigError::Validation {
            message: message.into(),
            position: position.into(),
        }
    }

    /// Source position of the failure, if one is known.
    pub fn position(&self) -> Option<StreamPosition> {
        match self {
            ConfigError::Parse { position, .. }
            | ConfigError::Load { position, .. }
            | ConfigError::Validation { position, .. } => *position,
            _ => None,
        }
    }
}

/// Rejection from a field validator or a post-processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}
