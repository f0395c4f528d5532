use anyhow::{Context, Result};
use pose_coach::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where analysis results are written when `--output` is not given
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Also write the frames without overlays
    #[serde(default)]
    pub write_raw_frames: bool,

    /// Discipline used when `--discipline` is not given
    #[serde(default = "default_discipline")]
    pub default_discipline: String,
}

// Default value functions
fn default_output_directory() -> PathBuf {
    PathBuf::from("pose-analysis")
}

fn default_discipline() -> String {
    "generic".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            write_raw_frames: false,
            default_discipline: default_discipline(),
        }
    }
}

impl Config {
    /// Get config directory path (<config dir>/pose-coach/)
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not find config directory")?;
        Ok(base.join("pose-coach"))
    }

    /// Config file path: the explicit one if given, else
    /// <config dir>/pose-coach/config.toml
    pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Load configuration from file
    ///
    /// An explicitly named file must exist. Without a config file, analysis
    /// settings come from `POSE_COACH_*` environment variables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_file = Self::config_file(explicit)?;

        if !config_file.exists() {
            if explicit.is_some() {
                anyhow::bail!("Config file not found: {}", config_file.display());
            }
            tracing::debug!("Config file not found, using environment and defaults");
            return Ok(Self {
                analysis: AnalysisConfig::from_env()?,
                output: OutputConfig::default(),
            });
        }

        let contents = fs::read_to_string(&config_file).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config.analysis.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let config_file = Self::config_file(explicit)?;
        if let Some(parent) = config_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_file, contents).context("Failed to write config file")?;

        Ok(config_file)
    }
}
