// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via config, environment variable, or TTY
//! prompt.

use secrecy::SecretString;
use webgpg_config::WebgpgConfig;
use webgpg_core::WebgpgError;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "WEBGPG_MASTER_PASSWORD";

/// Resolve the master password for an interactive invocation.
///
/// Priority:
/// 1. `auth.master_password` from configuration
/// 2. `WEBGPG_MASTER_PASSWORD` environment variable (headless/Docker/systemd)
/// 3. Interactive TTY prompt via `rpassword` (human operators)
///
/// Returns a `Config` error if no source yields a non-empty password.
pub fn resolve_master_password(config: &WebgpgConfig) -> Result<SecretString, WebgpgError> {
    if let Some(ref password) = config.auth.master_password
        && !password.is_empty()
    {
        return Ok(SecretString::from(password.clone()));
    }

    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Master password: ");
        let password = rpassword::read_password()
            .map_err(|e| WebgpgError::Config(format!("failed to read password: {e}")))?;
        if password.is_empty() {
            return Err(WebgpgError::Config("empty master password not allowed".to_string()));
        }
        return Ok(SecretString::from(password));
    }

    Err(WebgpgError::Config(
        "no master password provided. Set auth.master_password, set the WEBGPG_MASTER_PASSWORD environment variable, or run interactively."
            .to_string(),
    ))
}
