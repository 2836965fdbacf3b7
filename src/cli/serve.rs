//! Serve command implementation

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::config::CliOverrides;
use crate::server;

use super::{load_generator, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the serve command
pub fn run_serve(config: Option<&Path>, overrides: CliOverrides) -> ExitCode {
    let (config, generator) = match load_generator(config, &overrides) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if generator.fonts().is_empty() {
        tracing::warn!(dir = %config.assets.fonts.display(), "no fonts found, font_path requests will use the defaults");
    }

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let host = config.server.host.clone();
    let port = config.server.port;
    match rt.block_on(server::serve(Arc::new(generator), &host, port)) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: Failed to serve on {}:{}: {}", host, port, e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
