//! chrtool - Command-line tool for converting between NES CHR data and PNG images

use std::process::ExitCode;

use chrtool::cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    cli::run()
}
