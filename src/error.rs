//! Error types for sticker generation

use std::path::PathBuf;

use thiserror::Error;

/// Which asset a [`GenerateError::ResourceMissing`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Background,
    Font,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Background => write!(f, "Background image"),
            ResourceKind::Font => write!(f, "Font file"),
        }
    }
}

/// Error raised while resolving a character or rendering a sticker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// No character or team alias matched the requested name
    #[error("Character or team '{name}' not found.{}", suggestion.as_ref().map(|s| format!(" {}", s)).unwrap_or_default())]
    NotFound { name: String, suggestion: Option<String> },
    /// A background or font asset is absent on disk
    #[error("{kind} not found at {}", path.display())]
    ResourceMissing { kind: ResourceKind, path: PathBuf },
    /// The font file exists but cannot be used at the requested size
    #[error("Failed to load font from {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },
    /// Font size or outline too large to rasterize
    #[error(transparent)]
    TextTooLarge(#[from] crate::text::TextTooLarge),
    /// File system failure while reading inputs or writing the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Image decoding or encoding failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Anything else
    #[error("{0}")]
    Unclassified(String),
}

impl GenerateError {
    pub fn not_found(name: impl Into<String>) -> Self {
        GenerateError::NotFound { name: name.into(), suggestion: None }
    }

    pub fn missing(kind: ResourceKind, path: impl Into<PathBuf>) -> Self {
        GenerateError::ResourceMissing { kind, path: path.into() }
    }

    /// HTTP status the boundary layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GenerateError::NotFound { .. } => 404,
            GenerateError::TextTooLarge(_) => 400,
            _ => 500,
        }
    }

    /// Short machine-readable category, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::NotFound { .. } => "not_found",
            GenerateError::ResourceMissing { .. } => "resource_missing",
            GenerateError::FontLoad { .. } => "font_load",
            GenerateError::TextTooLarge(_) => "text_too_large",
            GenerateError::Io(_) | GenerateError::Image(_) | GenerateError::Unclassified(_) => {
                "unclassified"
            }
        }
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_without_suggestion() {
        let err = GenerateError::not_found("nobody");
        assert_eq!(err.to_string(), "Character or team 'nobody' not found.");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_not_found_message_with_suggestion() {
        let err = GenerateError::NotFound {
            name: "mikku".to_string(),
            suggestion: Some("Did you mean 'miku'?".to_string()),
        };
        assert_eq!(err.to_string(), "Character or team 'mikku' not found. Did you mean 'miku'?");
    }

    #[test]
    fn test_resource_missing_names_path() {
        let err = GenerateError::missing(ResourceKind::Font, "assets/fonts/none.ttf");
        assert_eq!(err.to_string(), "Font file not found at assets/fonts/none.ttf");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), "resource_missing");
    }

    #[test]
    fn test_text_too_large_is_client_error() {
        let err: GenerateError = crate::text::TextTooLarge { width: 150_000, height: 180_000 }.into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.kind(), "text_too_large");
        assert!(err.to_string().contains("150000x180000"));
    }

    #[test]
    fn test_io_is_unclassified() {
        let err: GenerateError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.kind(), "unclassified");
        assert_eq!(err.status_code(), 500);
    }
}
