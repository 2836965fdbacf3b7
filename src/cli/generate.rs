//! Generate command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::Rgb;
use crate::config::CliOverrides;
use crate::error::GenerateError;
use crate::generate::GenerateParams;

use super::{load_generator, EXIT_ERROR, EXIT_SUCCESS};

/// Arguments of `pjsk generate`
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub character: String,
    pub text: String,
    pub index: Option<i64>,
    pub position: (i32, i32),
    pub text_color: Option<Rgb>,
    pub font_size: u32,
    pub stroke_color: Rgb,
    pub stroke_width: u32,
    pub font: Option<String>,
    pub rotation: i32,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl GenerateArgs {
    fn params(&self) -> GenerateParams {
        GenerateParams {
            character: self.character.clone(),
            // Literal `\n` escapes become line breaks
            text: self.text.replace("\\n", "\n"),
            character_index: self.index,
            position: self.position,
            text_color: self.text_color,
            font_size: self.font_size,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            font_path: self.font.clone(),
            rotation_angle: self.rotation,
        }
    }
}

/// Execute the generate command
pub fn run_generate(config: Option<&Path>, args: GenerateArgs) -> ExitCode {
    let (_, generator) = match load_generator(config, &CliOverrides::default()) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match generator.generate(&args.params(), args.output.clone(), &mut rng) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if matches!(e, GenerateError::ResourceMissing { .. }) {
                eprintln!("Hint: check the [assets] paths in pjsk.toml");
            }
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: &str) -> GenerateArgs {
        GenerateArgs {
            character: "Miku".to_string(),
            text: text.to_string(),
            index: Some(2),
            position: (1, 2),
            text_color: None,
            font_size: 40,
            stroke_color: Rgb::BLACK,
            stroke_width: 2,
            font: Some("yuruka".to_string()),
            rotation: -5,
            output: None,
            seed: None,
        }
    }

    #[test]
    fn test_params_carry_every_field() {
        let params = args("hi").params();
        assert_eq!(params.character, "Miku");
        assert_eq!(params.character_index, Some(2));
        assert_eq!(params.position, (1, 2));
        assert_eq!(params.font_size, 40);
        assert_eq!(params.stroke_color, Rgb::BLACK);
        assert_eq!(params.stroke_width, 2);
        assert_eq!(params.font_path.as_deref(), Some("yuruka"));
        assert_eq!(params.rotation_angle, -5);
    }

    #[test]
    fn test_escaped_newline() {
        assert_eq!(args("one\\ntwo").params().text, "one\ntwo");
    }
}
