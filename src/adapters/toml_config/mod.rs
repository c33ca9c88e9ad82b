// TOML config adapter - Layered configuration: env > file > defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::SplitInterval;
use crate::error::{SplitXError, SplitXResult};

/// Runtime configuration for the splitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Split interval used until the user picks another one
    #[serde(rename = "interval_minutes")]
    pub interval: SplitInterval,
    /// Where delivered segments are saved
    pub output_dir: PathBuf,
    /// Engine workspace; a temporary directory when unset
    pub workspace_dir: Option<PathBuf>,
    /// Default log level when RUST_LOG is not set
    pub log_level: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            interval: SplitInterval::default(),
            output_dir: PathBuf::from("."),
            workspace_dir: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    splitter: SplitterConfig,
}

/// Environment variables and the config keys they override
const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("SPLITTER_INTERVAL", "interval_minutes"),
    ("SPLITTER_OUTPUT_DIR", "output_dir"),
    ("SPLITTER_WORKSPACE_DIR", "workspace_dir"),
    ("SPLITTER_LOG_LEVEL", "log_level"),
];

/// TOML configuration loader
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Config file picked up from the working directory when none is given
    pub const DEFAULT_FILE: &'static str = "splitter.toml";

    /// Load defaults, then the config file, then environment overrides
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> SplitXResult<SplitterConfig> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => {
                let default_path = Path::new(Self::DEFAULT_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)?
                } else {
                    debug!("No config file found, using defaults");
                    SplitterConfig::default()
                }
            }
        };

        Self::apply_env(&mut config, |key| std::env::var(key).ok())?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn load_file(path: &Path) -> SplitXResult<SplitterConfig> {
        if !path.exists() {
            return Err(SplitXError::ConfigError {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        info!(file = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse a `[splitter]` TOML document
    pub fn parse(content: &str) -> SplitXResult<SplitterConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| SplitXError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })?;
        Ok(file.splitter)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(config: &mut SplitterConfig, lookup: F) -> SplitXResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides = 0;
        for &(env_var, key) in ENV_MAPPINGS {
            let Some(value) = lookup(env_var) else {
                continue;
            };
            debug!("Found environment override: {} = {}", env_var, value);
            match key {
                "interval_minutes" => {
                    let minutes: u8 = value.trim().parse().map_err(|e| SplitXError::ConfigError {
                        message: format!("Invalid {}: {}", env_var, e),
                    })?;
                    config.interval =
                        SplitInterval::new(minutes).map_err(|e| SplitXError::ConfigError {
                            message: format!("Invalid {}: {}", env_var, e),
                        })?;
                }
                "output_dir" => config.output_dir = PathBuf::from(value),
                "workspace_dir" => config.workspace_dir = Some(PathBuf::from(value)),
                "log_level" => config.log_level = value,
                _ => continue,
            }
            overrides += 1;
        }

        if overrides > 0 {
            debug!("Applied {} environment variable overrides", overrides);
        }
        Ok(())
    }

    /// Validate values that serde cannot check on its own
    pub fn validate(config: &SplitterConfig) -> SplitXResult<()> {
        config
            .log_level
            .parse::<tracing::Level>()
            .map_err(|_| SplitXError::ConfigError {
                message: format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    config.log_level
                ),
            })?;
        if config.output_dir.as_os_str().is_empty() {
            return Err(SplitXError::ConfigError {
                message: "output_dir cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
