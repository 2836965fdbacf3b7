//! pjsk-sticker - Project Sekai style sticker generator
//!
//! This library provides functionality to:
//! - Resolve character and team aliases to sticker art
//! - Draw outlined, multi-line text onto a sticker and rotate it
//! - Serve generation over a small HTTP API (feature `server`)

pub mod cli;
pub mod color;
pub mod composite;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fonts;
pub mod generate;
pub mod render;
pub mod resolve;
pub mod rotate;
#[cfg(feature = "server")]
pub mod server;
pub mod suggest;
pub mod text;

pub use error::{GenerateError, Result};
pub use generate::{GenerateParams, Generator};
