//! Configuration schema types for `pjsk.toml`
//!
//! Defines the structure and validation rules for the sticker generator
//! configuration. Every section is optional; an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Asset locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Sticker art root, laid out as `<team>/<roma>/<roma><index>.png`
    pub stickers: PathBuf,
    /// Directory scanned for font files
    pub fonts: PathBuf,
    /// Team and character table
    pub characters: PathBuf,
    /// Sticker count per character
    pub sticker_counts: PathBuf,
    /// Default text color per character
    pub colors: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            stickers: PathBuf::from("assets/pjsk_sticker"),
            fonts: PathBuf::from("assets/fonts"),
            characters: PathBuf::from("assets/characters.json"),
            sticker_counts: PathBuf::from("assets/character_stickers.json"),
            colors: PathBuf::from("assets/character_colors.json"),
        }
    }
}

impl AssetsConfig {
    /// Make every relative path relative to `root` instead.
    pub fn rebase(&mut self, root: &Path) {
        for path in [
            &mut self.stickers,
            &mut self.fonts,
            &mut self.characters,
            &mut self.sticker_counts,
            &mut self.colors,
        ] {
            *path = super::resolve_path(root, path);
        }
    }
}

/// Font files used when the caller does not name one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// File name inside the fonts directory for general text
    pub default: String,
    /// File name inside the fonts directory for text containing kana
    pub kana: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self { default: "ShangShouFangTangTi.ttf".to_string(), kana: "YurukaStd.ttf".to_string() }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8000 }
    }
}

/// Where generated stickers go
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Defaults to `pjsk_sticker` under the system temp directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| std::env::temp_dir().join("pjsk_sticker"))
    }
}

/// Complete `pjsk.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PjskConfig {
    pub assets: AssetsConfig,
    pub fonts: FontsConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "server.port")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pjsk.toml: '{}' {}", self.field, self.message)
    }
}

impl PjskConfig {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError { field: field.to_string(), message: message.to_string() });
        };

        if self.server.host.trim().is_empty() {
            push("server.host", "must be a non-empty string");
        }
        if self.server.port == 0 {
            push("server.port", "must be between 1 and 65535");
        }
        if self.fonts.default.trim().is_empty() {
            push("fonts.default", "must name a font file");
        }
        if self.fonts.kana.trim().is_empty() {
            push("fonts.kana", "must name a font file");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Full path of the default font
    pub fn default_font_path(&self) -> PathBuf {
        self.assets.fonts.join(&self.fonts.default)
    }

    /// Full path of the kana font
    pub fn kana_font_path(&self) -> PathBuf {
        self.assets.fonts.join(&self.fonts.kana)
    }
}
