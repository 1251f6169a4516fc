// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics rendered through miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error with diagnostic metadata for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A semantic validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(webgpg::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// A parse or deserialization error from the config loader.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(webgpg::config::parse),
        help("check webgpg.toml against the documented [auth]/[kdf]/[storage] keys")
    )]
    Parse(String),
}

/// Convert a figment extraction error into diagnostics, one per failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse(e.to_string()))
        .collect()
}

/// Render config errors to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
