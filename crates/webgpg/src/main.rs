// SPDX-FileCopyrightText: 2026 Webgpg Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! webgpg - operator CLI for the secret-protection subsystem.
//!
//! Exercises the vault end to end: passphrase envelopes, master password
//! verification, and session tokens, against the configured salt backend.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Parser, Subcommand};
use webgpg_config::WebgpgConfig;
use webgpg_core::WebgpgError;
use webgpg_vault::{SaltStore, Vault, resolve_master_password};

/// webgpg - credential and secret protection for the PGP key store.
#[derive(Parser, Debug)]
#[command(name = "webgpg", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a value (argument or stdin) into a base64 envelope.
    Encrypt {
        /// Plaintext to protect; read from stdin when omitted.
        plaintext: Option<String>,
    },
    /// Decrypt a base64 envelope (argument or stdin).
    Decrypt {
        /// Envelope to reveal; read from stdin when omitted.
        envelope: Option<String>,
    },
    /// Check a candidate password against the configured master password.
    VerifyPassword {
        /// Candidate password; read from stdin when omitted.
        candidate: Option<String>,
    },
    /// Issue and validate session tokens.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Inspect the persisted salt.
    Salt {
        #[command(subcommand)]
        action: SaltAction,
    },
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    /// Issue a signed session token for the current time.
    Issue,
    /// Validate a presented token.
    Verify {
        token: String,
        /// Maximum accepted token age in seconds; defaults to
        /// auth.token_max_age_seconds.
        #[arg(long)]
        max_age: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
enum SaltAction {
    /// Print the base64 salt, generating and persisting it if absent.
    Show,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            webgpg_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("webgpg: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<WebgpgConfig, Vec<webgpg_config::ConfigError>> {
    match path {
        None => webgpg_config::load_and_validate(),
        Some(path) => match webgpg_config::load_config_from_path(path) {
            Ok(mut config) => {
                config.normalize();
                webgpg_config::validation::validate_config(&config)?;
                Ok(config)
            }
            Err(err) => Err(webgpg_config::diagnostic::figment_to_config_errors(err)),
        },
    }
}

async fn run(command: Commands, config: &WebgpgConfig) -> Result<ExitCode, WebgpgError> {
    let salt_store = open_salt_store(config).await?;

    if let Commands::Salt { action: SaltAction::Show } = command {
        let salt = salt_store.get_or_create().await?;
        println!("{}", BASE64.encode(salt));
        return Ok(ExitCode::SUCCESS);
    }

    let password = resolve_master_password(config)?;
    let vault = Vault::new(Some(password), config.kdf.clone(), salt_store);

    match command {
        Commands::Encrypt { plaintext } => {
            let plaintext = arg_or_stdin(plaintext)?;
            println!("{}", vault.encrypt(plaintext.as_bytes()).await?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Decrypt { envelope } => {
            let envelope = arg_or_stdin(envelope)?;
            let plaintext = vault.decrypt(envelope.trim()).await?;
            println!("{}", String::from_utf8_lossy(&plaintext));
            Ok(ExitCode::SUCCESS)
        }
        Commands::VerifyPassword { candidate } => {
            let candidate = arg_or_stdin(candidate)?;
            if vault.verify_master_password(candidate.trim_end()).await? {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Token { action: TokenAction::Issue } => {
            println!("{}", vault.issue_token().await?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Token { action: TokenAction::Verify { token, max_age } } => {
            let max_age = max_age.unwrap_or(config.auth.token_max_age_seconds);
            if vault.verify_token(token.trim(), max_age).await {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Salt { .. } => unreachable!("handled before password resolution"),
    }
}

/// Pick the salt backend: the database when one is configured, the salt
/// file otherwise.
async fn open_salt_store(config: &WebgpgConfig) -> Result<SaltStore, WebgpgError> {
    match config.storage.database_path {
        Some(ref path) => {
            let db = webgpg_storage::Database::open(path).await?;
            Ok(SaltStore::database(db.connection().clone()))
        }
        None => Ok(SaltStore::file(&config.storage.salt_file)),
    }
}

fn arg_or_stdin(arg: Option<String>) -> Result<String, WebgpgError> {
    match arg {
        Some(value) => Ok(value),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| WebgpgError::Internal(format!("failed to read stdin: {e}")))?;
            Ok(buf)
        }
    }
}
