//! Configuration management for funcgraph
//!
//! Settings are loaded from environment variables with sensible defaults. Command-line
//! flags override individual fields after loading.
//!
//! # Environment Variables
//!
//! - `FUNCGRAPH_LOG_LEVEL`: Logging level - default: "info"
//! - `FUNCGRAPH_GIT`: git executable used for cloning - default: "git"
//! - `FUNCGRAPH_DOTNET`: dotnet executable used for publishing - default: "dotnet"
//! - `FUNCGRAPH_TEMP_DIR`: parent folder for clone/publish output - default: system temp dir
//! - `FUNCGRAPH_SHALLOW_CLONE`: clone with `--depth 1` (true|false) - default: "true"
//!
//! # Example
//!
//! ```no_run
//! use funcgraph::FuncGraphConfig;
//!
//! let config = FuncGraphConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GIT_PROGRAM: &str = "git";
const DEFAULT_DOTNET_PROGRAM: &str = "dotnet";
const DEFAULT_SHALLOW_CLONE: bool = true;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("{field} must not be empty")]
    EmptyProgram { field: String },

    #[error("Temp directory does not exist: {0}")]
    TempDirMissing(PathBuf),
}

#[derive(Debug, Clone)]
pub struct FuncGraphConfig {
    /// git executable (name on PATH or absolute path)
    pub git_program: String,

    /// dotnet executable (name on PATH or absolute path)
    pub dotnet_program: String,

    /// Parent directory for clone and publish folders
    pub temp_dir: PathBuf,

    /// Clone with `--depth 1`
    pub shallow_clone: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for FuncGraphConfig {
    fn default() -> Self {
        let git_program =
            env::var("FUNCGRAPH_GIT").unwrap_or_else(|_| DEFAULT_GIT_PROGRAM.to_string());

        let dotnet_program =
            env::var("FUNCGRAPH_DOTNET").unwrap_or_else(|_| DEFAULT_DOTNET_PROGRAM.to_string());

        let temp_dir = env::var("FUNCGRAPH_TEMP_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let shallow_clone = env::var("FUNCGRAPH_SHALLOW_CLONE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_SHALLOW_CLONE);

        let log_level = env::var("FUNCGRAPH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            git_program,
            dotnet_program,
            temp_dir,
            shallow_clone,
            log_level,
        }
    }
}

impl FuncGraphConfig {
    /// Validates the configuration
    ///
    /// Checks that:
    /// - Log level is valid
    /// - Tool executables are non-empty
    /// - The temp directory exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        if self.git_program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram {
                field: "FUNCGRAPH_GIT".to_string(),
            });
        }

        if self.dotnet_program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram {
                field: "FUNCGRAPH_DOTNET".to_string(),
            });
        }

        if !self.temp_dir.is_dir() {
            return Err(ConfigError::TempDirMissing(self.temp_dir.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for FuncGraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "funcgraph configuration:")?;
        writeln!(f, "  git: {}", self.git_program)?;
        writeln!(f, "  dotnet: {}", self.dotnet_program)?;
        writeln!(f, "  temp dir: {}", self.temp_dir.display())?;
        writeln!(f, "  shallow clone: {}", self.shallow_clone)?;
        write!(f, "  log level: {}", self.log_level)
    }
}
