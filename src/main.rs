//! pjsk - Command-line tool for generating Project Sekai style stickers

use std::process::ExitCode;

use pjsk_sticker::cli;

fn main() -> ExitCode {
    cli::run()
}
