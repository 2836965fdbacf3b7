//! Info command implementations (characters, fonts)

use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::dataset::{Dataset, Team};
use crate::suggest::{format_suggestion, suggest};

use super::{load_generator, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the characters command
pub fn run_characters(config: Option<&Path>, team: Option<&str>) -> ExitCode {
    let (_, generator) = match load_generator(config, &CliOverrides::default()) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let dataset = generator.dataset();

    match team {
        None => {
            for team in dataset.teams() {
                print!("{}", format_team(dataset, team));
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Some(name) => match dataset.team(name) {
            Some(team) => {
                print!("{}", format_team(dataset, team));
                ExitCode::from(EXIT_SUCCESS)
            }
            None => {
                eprintln!("Error: Unknown team '{}'", name);
                let shortnames: Vec<&str> = dataset.teams().iter().map(|t| t.shortname.as_str()).collect();
                if let Some(hint) = format_suggestion(&suggest(name, &shortnames, 3)) {
                    eprintln!("{}", hint);
                }
                ExitCode::from(EXIT_ERROR)
            }
        },
    }
}

fn format_team(dataset: &Dataset, team: &Team) -> String {
    let mut out = format!("{}  ({})\n", team.shortname, team.names.join(", "));
    for character in &team.characters {
        out.push_str(&format!(
            "  {:<10} {:>3} stickers  {}  {}\n",
            character.roma,
            dataset.sticker_count(&character.roma),
            dataset.color(&character.roma),
            character.names.join(", ")
        ));
    }
    out
}

/// Execute the fonts command
pub fn run_fonts(config: Option<&Path>) -> ExitCode {
    let (_, generator) = match load_generator(config, &CliOverrides::default()) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let defaults = generator.default_fonts();
    println!("default: {}", defaults.default.display());
    println!("kana:    {}", defaults.kana.display());

    let fonts = generator.fonts();
    if fonts.is_empty() {
        println!("No fonts registered.");
        return ExitCode::from(EXIT_SUCCESS);
    }
    println!();
    for (name, path) in fonts.iter() {
        println!("  {:<24} {}", name, path.display());
    }
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::dataset::Character;
    use std::collections::HashMap;

    #[test]
    fn test_format_team() {
        let team = Team {
            shortname: "l/n".to_string(),
            names: vec!["l/n".to_string(), "leoneed".to_string()],
            characters: vec![Character { roma: "ichika".to_string(), names: vec!["ichika".to_string()] }],
        };
        let dataset = Dataset::new(
            vec![team.clone()],
            HashMap::from([("ichika".to_string(), 15)]),
            HashMap::from([("ichika".to_string(), Rgb::new(51, 170, 238))]),
        );

        let text = format_team(&dataset, &team);
        assert!(text.starts_with("l/n  (l/n, leoneed)\n"));
        assert!(text.contains("ichika"));
        assert!(text.contains(" 15 stickers"));
        assert!(text.contains("(51, 170, 238)"));
    }
}
