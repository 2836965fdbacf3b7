//! Shared fixture for integration tests: a scratch asset tree with a small
//! dataset, generated sticker backgrounds and the bundled test font.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use pjsk_sticker::config::{load_config, PjskConfig};
use pjsk_sticker::Generator;
use tempfile::TempDir;

pub const BACKGROUND: Rgba<u8> = Rgba([236, 240, 245, 255]);
pub const WIDTH: u32 = 296;
pub const HEIGHT: u32 = 256;

const CHARACTERS: &str = r#"{
    "virtual_singer": {
        "shortname": "vs",
        "names": ["vs", "virtual singer"],
        "characters": [
            {"roma": "miku", "names": ["miku", "Hatsune Miku", "初音ミク"]},
            {"roma": "rin", "names": ["rin"]}
        ]
    },
    "leo_need": {
        "shortname": "l/n",
        "names": ["l/n", "leoneed"],
        "characters": [
            {"roma": "ichika", "names": ["ichika"]},
            {"roma": "saki", "names": ["saki"]}
        ]
    },
    "empty_team": {
        "shortname": "none",
        "names": ["ghosts"],
        "characters": []
    }
}"#;

pub fn test_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/fonts/DejaVuSans.ttf")
}

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let root = dir.path();

        let data = root.join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("characters.json"), CHARACTERS).unwrap();
        fs::write(data.join("stickers.json"), r#"{"miku": 2, "rin": 1, "ichika": 3, "saki": 1}"#).unwrap();
        fs::write(data.join("colors.json"), r#"{"miku": [51, 204, 187], "ichika": [51, 170, 238]}"#).unwrap();

        for (team, roma, count) in [("vs", "miku", 2), ("vs", "rin", 1), ("l/n", "ichika", 3), ("l/n", "saki", 1)] {
            let art = root.join("art").join(team).join(roma);
            fs::create_dir_all(&art).unwrap();
            for i in 1..=count {
                RgbaImage::from_pixel(WIDTH, HEIGHT, BACKGROUND).save(art.join(format!("{roma}{i}.png"))).unwrap();
            }
        }

        let fonts = root.join("fonts");
        fs::create_dir_all(&fonts).unwrap();
        fs::copy(test_font(), fonts.join("DejaVuSans.ttf")).unwrap();

        fs::write(
            root.join("pjsk.toml"),
            r#"
[assets]
stickers = "art"
fonts = "fonts"
characters = "data/characters.json"
sticker_counts = "data/stickers.json"
colors = "data/colors.json"

[fonts]
default = "DejaVuSans.ttf"
kana = "DejaVuSans.ttf"

[output]
dir = "out"
"#,
        )
        .unwrap();

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("pjsk.toml")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn config(&self) -> PjskConfig {
        load_config(Some(&self.config_path())).expect("fixture config should load")
    }

    pub fn generator(&self) -> Generator {
        Generator::from_config(&self.config()).expect("fixture dataset should load")
    }
}
