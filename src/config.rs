//! Configuration for sol-store
//!
//! CLI arguments and environment variable handling using clap. An env file
//! (`SOL_ENV_FILE`, else `.env`) is loaded before parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::SolError;

/// Operator tool for the SOL agreement and TFA stores
#[derive(Parser, Debug, Clone)]
#[command(name = "sol-store")]
#[command(about = "Inspect and maintain SOL agreements and TFA bindings")]
pub struct Args {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "sol")]
    pub mongodb_db: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Reject writes that reference missing documents
    #[arg(long, env = "REFERENCE_CHECKS", default_value = "false")]
    pub reference_checks: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Agreement operations
    #[command(subcommand)]
    Agreements(AgreementCommand),

    /// TFA binding operations
    #[command(subcommand)]
    Tfa(TfaCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum AgreementCommand {
    /// List active agreements with full hydration
    List,
    /// Show one agreement by id
    Show { id: String },
    /// Soft-delete an agreement
    Delete { id: String },
    /// Active agreements managed by a general project manager
    ForManager { manager_id: String },
    /// Active agreements of an association
    ForAssociation { association_id: String },
    /// Assign a new manager
    SetManager { id: String, manager_id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TfaCommand {
    /// Show a user's binding
    Show { user_id: String },
    /// Remove a user's binding
    Delete { user_id: String },
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SolError> {
        if !self.mongodb_uri.starts_with("mongodb://") && !self.mongodb_uri.starts_with("mongodb+srv://")
        {
            return Err(SolError::Config(format!(
                "MONGODB_URI must start with mongodb:// or mongodb+srv://, got '{}'",
                self.mongodb_uri
            )));
        }

        if self.mongodb_db.trim().is_empty() {
            return Err(SolError::Config("MONGODB_DB must not be empty".into()));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(SolError::Config(format!(
                "LOG_LEVEL must be one of {:?}, got '{}'",
                LEVELS, self.log_level
            )));
        }

        Ok(())
    }
}

/// Load environment overrides from an env file, if one exists.
///
/// Returns the path that was loaded.
pub fn load_env_file() -> Option<PathBuf> {
    match std::env::var_os("SOL_ENV_FILE") {
        Some(path) => {
            let path = PathBuf::from(path);
            dotenvy::from_path(&path).ok().map(|_| path)
        }
        None => dotenvy::dotenv().ok(),
    }
}
