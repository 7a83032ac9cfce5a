//! Pretty-printing messages to the console
//!
//! Two independent channels: [`diagnostic`] and [`error`] print the
//! user-facing wording the assembler's error taxonomy requires, colorized
//! with `colored`. [`init_tracing`] wires up `env_logger` for internal
//! `log::debug!`/`log::trace!` calls made at stage boundaries — those are
//! developer-facing (`RUST_LOG=debug`), not part of the diagnostic output.

use colored::Colorize;

/// Pretty-print a per-line diagnostic: `file at line N: <kind text>`
pub fn diagnostic(file_stem: &str, line_number: usize, kind_text: &str) {
    let prefix = "error:".red().bold();
    eprintln!("{} {} at line {}: {}", prefix, file_stem, line_number, kind_text);
}

/// Pretty-print a stage-fatal error that has no associated source line
/// (file not found, write failure, internal consistency failure)
pub fn error(error_message: String) {
    let error_title = "error:".red().bold();
    eprintln!("{} {}", error_title, error_message);
}

/// Initialize the internal tracing subscriber. Controlled by `RUST_LOG`;
/// defaults to silent when unset.
pub fn init_tracing() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
}
