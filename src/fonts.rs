//! Font registry and default font selection
//!
//! The registry maps a normalized font name (lowercased file stem) to the
//! font file. Caller-supplied names are matched approximately, so
//! `"yuruka"` finds `YurukaStd.ttf`. When nothing matches, the font is chosen
//! from the text itself: kana needs the kana-capable font.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use glob::glob;

use crate::error::{GenerateError, ResourceKind, Result};
use crate::suggest::{closest_match, DEFAULT_CUTOFF};

/// Which of the two bundled fonts to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChoice {
    Default,
    Kana,
}

/// True if `text` contains hiragana (U+3040-U+309F) or katakana (U+30A0-U+30FF).
pub fn contains_kana(text: &str) -> bool {
    text.chars().any(|c| ('\u{3040}'..='\u{30FF}').contains(&c))
}

/// Pick the bundled font able to draw `text`.
pub fn select_font(text: &str) -> FontChoice {
    if contains_kana(text) {
        FontChoice::Kana
    } else {
        FontChoice::Default
    }
}

/// The two fonts used when the caller does not name one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFonts {
    pub default: PathBuf,
    pub kana: PathBuf,
}

impl DefaultFonts {
    pub fn path_for(&self, choice: FontChoice) -> &Path {
        match choice {
            FontChoice::Default => &self.default,
            FontChoice::Kana => &self.kana,
        }
    }

    /// Font path for `text`.
    pub fn for_text(&self, text: &str) -> &Path {
        self.path_for(select_font(text))
    }
}

/// Named fonts available to callers.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: BTreeMap<String, PathBuf>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self { fonts: BTreeMap::new() }
    }

    /// Register every `.ttf`, `.otf` and `.ttc` file directly inside `dir`.
    ///
    /// A missing directory yields an empty registry.
    pub fn from_dir(dir: &Path) -> Self {
        let mut registry = Self::new();
        for ext in ["ttf", "otf", "ttc"] {
            let pattern = format!("{}/*.{}", dir.display(), ext);
            let Ok(paths) = glob(&pattern) else {
                continue;
            };
            for path in paths.filter_map(std::result::Result::ok) {
                registry.insert_path(path);
            }
        }
        tracing::debug!(dir = %dir.display(), fonts = registry.len(), "scanned font directory");
        registry
    }

    /// Register a font under an explicit name.
    pub fn insert(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.fonts.insert(normalize(name), path.into());
    }

    /// Register a font under its file stem.
    pub fn insert_path(&mut self, path: PathBuf) {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            let name = normalize(stem);
            self.fonts.insert(name, path);
        }
    }

    /// Exact lookup by normalized name.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.fonts.get(&normalize(name)).map(PathBuf::as_path)
    }

    /// Closest registered font to `query`, if any is similar enough.
    pub fn closest(&self, query: &str) -> Option<&Path> {
        let names: Vec<&str> = self.fonts.keys().map(String::as_str).collect();
        let best = closest_match(&normalize(query), &names, DEFAULT_CUTOFF)?;
        self.get(best)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.fonts.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read and parse a font file.
///
/// A missing file is a [`GenerateError::ResourceMissing`]; a file that is not
/// a usable font is a [`GenerateError::FontLoad`].
pub fn load_font(path: &Path) -> Result<FontVec> {
    if !path.exists() {
        return Err(GenerateError::missing(ResourceKind::Font, path));
    }
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data)
        .map_err(|e| GenerateError::FontLoad { path: path.to_path_buf(), reason: e.to_string() })
}
