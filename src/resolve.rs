//! Character resolution
//!
//! Turns a free-form character or team name into a concrete sticker: the
//! background image path, the sticker index and the character's default
//! text color. Character aliases are checked before team aliases; a team
//! match picks one of its characters at random.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::color::Rgb;
use crate::dataset::{Character, Dataset, Team};
use crate::error::{GenerateError, Result};
use crate::suggest::{format_suggestion, suggest};

/// Maximum edit distance for "did you mean" hints on unknown names.
const SUGGESTION_DISTANCE: usize = 2;

/// A fully resolved sticker selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub background_path: PathBuf,
    pub sticker_index: i64,
    pub default_color: Rgb,
    /// Team shortname
    pub team: String,
    /// Character roma
    pub roma: String,
}

/// Resolves names against a dataset snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    dataset: &'a Dataset,
    sticker_root: &'a Path,
}

impl<'a> Resolver<'a> {
    pub fn new(dataset: &'a Dataset, sticker_root: &'a Path) -> Self {
        Self { dataset, sticker_root }
    }

    /// Resolve `name` to a sticker.
    ///
    /// `explicit_index` is used as-is when given; it is not checked against
    /// the sticker count, so an index with no art behind it fails later when
    /// the background is loaded.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        name: &str,
        explicit_index: Option<i64>,
        rng: &mut R,
    ) -> Result<Resolution> {
        let lowered = name.to_lowercase();

        let (team, character) = match self.find_character(&lowered) {
            Some(found) => found,
            None => self.pick_from_team(&lowered, rng).ok_or_else(|| self.not_found(name))?,
        };

        let sticker_index = match explicit_index {
            Some(index) => index,
            None => i64::from(rng.gen_range(1..=self.dataset.sticker_count(&character.roma))),
        };

        let background_path = sticker_path(self.sticker_root, &team.shortname, &character.roma, sticker_index);

        tracing::debug!(
            name,
            team = %team.shortname,
            roma = %character.roma,
            sticker_index,
            "resolved character"
        );

        Ok(Resolution {
            background_path,
            sticker_index,
            default_color: self.dataset.color(&character.roma),
            team: team.shortname.clone(),
            roma: character.roma.clone(),
        })
    }

    /// First character, in dataset order, carrying the alias.
    fn find_character(&self, lowered: &str) -> Option<(&'a Team, &'a Character)> {
        self.dataset
            .teams()
            .iter()
            .find_map(|team| team.characters.iter().find(|c| c.matches(lowered)).map(|c| (team, c)))
    }

    /// Random character from the first team carrying the alias.
    fn pick_from_team<R: Rng + ?Sized>(
        &self,
        lowered: &str,
        rng: &mut R,
    ) -> Option<(&'a Team, &'a Character)> {
        self.dataset
            .teams()
            .iter()
            .filter(|team| team.matches(lowered))
            .find_map(|team| team.characters.choose(&mut *rng).map(|c| (team, c)))
    }

    fn not_found(&self, name: &str) -> GenerateError {
        let aliases = self.dataset.aliases();
        let suggestions = suggest(name, &aliases, SUGGESTION_DISTANCE);
        GenerateError::NotFound { name: name.to_string(), suggestion: format_suggestion(&suggestions) }
    }
}

/// `<root>/<team>/<roma>/<roma><index>.png`
pub fn sticker_path(root: &Path, team: &str, roma: &str, index: i64) -> PathBuf {
    root.join(team).join(roma).join(format!("{}{}.png", roma, index))
}
