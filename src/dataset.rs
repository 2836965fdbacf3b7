//! Static character datasets
//!
//! Three JSON tables describe the sticker art that ships with the assets:
//!
//! - `characters.json`: an object of team records, in display order
//! - `character_stickers.json`: `roma -> number of sticker variants`
//! - `character_colors.json`: `roma -> [r, g, b]` default text color
//!
//! They are loaded once into a [`Dataset`] snapshot and shared read-only.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::color::Rgb;

/// Dataset loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// File I/O error
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON parsing error
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A character, keyed by its romanized name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Character {
    pub roma: String,
    /// Aliases, stored lowercase
    #[serde(default, deserialize_with = "lowercase_names")]
    pub names: Vec<String>,
}

impl Character {
    pub fn matches(&self, lowered: &str) -> bool {
        self.names.iter().any(|n| n == lowered)
    }
}

/// A group of characters sharing an asset directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub shortname: String,
    /// Aliases, stored lowercase
    #[serde(default, deserialize_with = "lowercase_names")]
    pub names: Vec<String>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Team {
    pub fn matches(&self, lowered: &str) -> bool {
        self.names.iter().any(|n| n == lowered)
    }
}

fn lowercase_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names.into_iter().map(|n| n.to_lowercase()).collect())
}

/// Immutable snapshot of the three tables.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    teams: Vec<Team>,
    sticker_counts: HashMap<String, u32>,
    colors: HashMap<String, Rgb>,
}

impl Dataset {
    pub fn new(
        teams: Vec<Team>,
        sticker_counts: HashMap<String, u32>,
        colors: HashMap<String, Rgb>,
    ) -> Self {
        Self { teams, sticker_counts, colors }
    }

    /// Load the three tables from disk.
    pub fn load(characters: &Path, sticker_counts: &Path, colors: &Path) -> Result<Self, DatasetError> {
        let teams = parse_teams(&read_json(characters)?, characters)?;
        let sticker_counts: HashMap<String, u32> = parse_json(sticker_counts)?;
        let colors: HashMap<String, Rgb> = parse_json(colors)?;

        tracing::debug!(
            teams = teams.len(),
            characters = teams.iter().map(|t| t.characters.len()).sum::<usize>(),
            "loaded character dataset"
        );

        Ok(Self { teams, sticker_counts, colors })
    }

    /// Teams in dataset order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Number of sticker variants for a character; missing entries count as 1.
    pub fn sticker_count(&self, roma: &str) -> u32 {
        self.sticker_counts.get(roma).copied().unwrap_or(1).max(1)
    }

    /// Default text color for a character; missing entries are black.
    pub fn color(&self, roma: &str) -> Rgb {
        self.colors.get(roma).copied().unwrap_or(Rgb::BLACK)
    }

    /// Find a team by shortname or alias.
    pub fn team(&self, name: &str) -> Option<&Team> {
        let lowered = name.to_lowercase();
        self.teams.iter().find(|t| t.shortname.to_lowercase() == lowered || t.matches(&lowered))
    }

    /// Every character and team alias, in dataset order.
    pub fn aliases(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for team in &self.teams {
            for character in &team.characters {
                out.extend(character.names.iter().map(String::as_str));
            }
        }
        for team in &self.teams {
            out.extend(team.names.iter().map(String::as_str));
        }
        out
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, DatasetError> {
    let text =
        fs::read_to_string(path).map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Parse { path: path.to_path_buf(), source })
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    serde_json::from_value(read_json(path)?)
        .map_err(|source| DatasetError::Parse { path: path.to_path_buf(), source })
}

/// Team records keep the key order of the JSON object.
fn parse_teams(value: &serde_json::Value, path: &Path) -> Result<Vec<Team>, DatasetError> {
    let parse_err = |source: serde_json::Error| DatasetError::Parse { path: path.to_path_buf(), source };

    match value {
        serde_json::Value::Object(map) => map
            .values()
            .map(|team| Team::deserialize(team).map_err(parse_err))
            .collect(),
        other => Vec::<Team>::deserialize(other).map_err(parse_err),
    }
}
