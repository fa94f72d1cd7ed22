//! Error types for style conversion

use std::path::PathBuf;
use thiserror::Error;

/// Conversion result type
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Everything that can stop a conversion.
///
/// Only `InvalidDeclaration`, `SinkWrite`, `NameSpaceExhausted` and `Selection` ever
/// reach the user. `StylesheetRead` is logged by the matcher and the search moves on.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("The selected text is not a valid CSS property: {text}")]
    InvalidDeclaration { text: String },

    #[error("Failed to read stylesheet {}: {source}", path.display())]
    StylesheetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append the new style to {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No free class name left with prefix '{prefix}'")]
    NameSpaceExhausted { prefix: String },

    #[error("Invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Selection error: {0}")]
    Selection(String),
}

impl ConvertError {
    pub fn invalid_declaration(text: impl Into<String>) -> Self {
        Self::InvalidDeclaration { text: text.into() }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors that abort before any file was touched.
    pub fn is_before_mutation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDeclaration { .. } | Self::Config { .. } | Self::Selection(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_declaration_display() {
        let err = ConvertError::invalid_declaration("margin 10px");
        assert_eq!(
            err.to_string(),
            "The selected text is not a valid CSS property: margin 10px"
        );
        assert!(err.is_before_mutation());
    }

    #[test]
    fn test_sink_write_display() {
        let err = ConvertError::SinkWrite {
            path: PathBuf::from("/tmp/cspfix.css"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to append the new style to /tmp/cspfix.css: denied"
        );
        assert!(!err.is_before_mutation());
    }
}
