//! Configuration for the sticker generator
//!
//! Provides types and parsing for `pjsk.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
