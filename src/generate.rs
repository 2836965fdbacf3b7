//! Sticker generation entry point
//!
//! [`Generator`] holds the immutable state loaded at startup (dataset, font
//! registry, asset locations) and turns a [`GenerateParams`] into a PNG on
//! disk. It is shared read-only between the CLI and the HTTP handlers.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::PjskConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::error::Result;
use crate::fonts::{DefaultFonts, FontRegistry};
use crate::render::{render, RenderRequest};
use crate::resolve::{Resolution, Resolver};

fn default_position() -> (i32, i32) {
    (20, 10)
}

fn default_font_size() -> u32 {
    50
}

fn default_stroke_color() -> Rgb {
    Rgb::WHITE
}

fn default_stroke_width() -> u32 {
    4
}

fn default_rotation() -> i32 {
    15
}

/// Caller-facing parameters for one sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateParams {
    /// Character or team alias
    pub character: String,
    pub text: String,
    /// 1-based sticker index; random when absent
    #[serde(default)]
    pub character_index: Option<i64>,
    #[serde(default = "default_position")]
    pub position: (i32, i32),
    /// Defaults to the character's color
    #[serde(default)]
    pub text_color: Option<Rgb>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: Rgb,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Font name, matched approximately against the registry
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default = "default_rotation")]
    pub rotation_angle: i32,
}

impl GenerateParams {
    /// Parameters with every optional field at its default.
    pub fn new(character: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            text: text.into(),
            character_index: None,
            position: default_position(),
            text_color: None,
            font_size: default_font_size(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            font_path: None,
            rotation_angle: default_rotation(),
        }
    }
}

/// Loaded state for generating stickers.
#[derive(Debug, Clone)]
pub struct Generator {
    dataset: Dataset,
    fonts: FontRegistry,
    default_fonts: DefaultFonts,
    sticker_root: PathBuf,
    output_dir: PathBuf,
}

impl Generator {
    pub fn new(
        dataset: Dataset,
        fonts: FontRegistry,
        default_fonts: DefaultFonts,
        sticker_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dataset,
            fonts,
            default_fonts,
            sticker_root: sticker_root.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Load the dataset and scan the fonts directory named by `config`.
    pub fn from_config(config: &PjskConfig) -> std::result::Result<Self, DatasetError> {
        let assets = &config.assets;
        let dataset = Dataset::load(&assets.characters, &assets.sticker_counts, &assets.colors)?;
        let fonts = FontRegistry::from_dir(&assets.fonts);
        let default_fonts =
            DefaultFonts { default: config.default_font_path(), kana: config.kana_font_path() };
        Ok(Self::new(dataset, fonts, default_fonts, &assets.stickers, config.output.dir()))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn default_fonts(&self) -> &DefaultFonts {
        &self.default_fonts
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolve a character name without rendering.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        name: &str,
        explicit_index: Option<i64>,
        rng: &mut R,
    ) -> Result<Resolution> {
        Resolver::new(&self.dataset, &self.sticker_root).resolve(name, explicit_index, rng)
    }

    /// Font file for a request: the closest registered name, or the default
    /// font for the text when the name is absent or matches nothing.
    pub fn font_for(&self, requested: Option<&str>, text: &str) -> PathBuf {
        if let Some(name) = requested {
            if let Some(path) = self.fonts.closest(name) {
                return path.to_path_buf();
            }
            tracing::debug!(font = name, "no registered font close enough, using default");
        }
        self.default_fonts.for_text(text).to_path_buf()
    }

    /// Generate a sticker, writing to `output` or a fresh file in the output
    /// directory. Returns the absolute path of the PNG.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        params: &GenerateParams,
        output: Option<PathBuf>,
        rng: &mut R,
    ) -> Result<PathBuf> {
        let character = params.character.to_lowercase();
        let resolution = self.resolve(&character, params.character_index, rng)?;

        let output_path = match output {
            Some(path) => path,
            None => self.output_dir.join(output_file_name(rng)),
        };

        let request = RenderRequest {
            background_path: resolution.background_path,
            text: params.text.clone(),
            position: params.position,
            text_color: params.text_color.unwrap_or(resolution.default_color),
            font_size: params.font_size,
            stroke_color: params.stroke_color,
            stroke_width: params.stroke_width,
            font_path: self.font_for(params.font_path.as_deref(), &params.text),
            rotation_angle: params.rotation_angle,
            output_path,
        };
        render(&request)
    }
}

/// `<unix millis>-<random hex>.png`
pub fn output_file_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
    format!("{}-{:08x}.png", millis, rng.gen::<u32>())
}
