use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VeriteeConfig {
    /// Directory polled for pending work-unit files.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Supervised computation program; pipeline-only mode when unset.
    #[serde(default)]
    pub program: Option<PathBuf>,

    #[serde(default)]
    pub program_args: Vec<String>,

    /// JSON file with the pinned attestation keys.
    #[serde(default = "default_trust_store")]
    pub trust_store: PathBuf,

    /// JSON file with the appraisal policy.
    #[serde(default = "default_policy")]
    pub policy: PathBuf,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Whether a failed verification halts the whole pipeline.
    #[serde(default = "default_stop_at_first_failure")]
    pub stop_at_first_failure: bool,
}

fn veritee_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".veritee")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("blocks")
}

fn default_trust_store() -> PathBuf {
    veritee_home().join("trusted_keys.json")
}

fn default_policy() -> PathBuf {
    veritee_home().join("policy.json")
}

fn default_poll_interval() -> u64 {
    5
}

fn default_stop_at_first_failure() -> bool {
    true
}

impl Default for VeriteeConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            program: None,
            program_args: Vec::new(),
            trust_store: default_trust_store(),
            policy: default_policy(),
            poll_interval_secs: default_poll_interval(),
            stop_at_first_failure: default_stop_at_first_failure(),
        }
    }
}

impl VeriteeConfig {
    /// Load the configuration, from `override_path` when given, otherwise
    /// from the default location (created with defaults on first run).
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .context(format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&contents)
                    .context(format!("Failed to parse config file: {}", path.display()))
            }
            None => {
                let config_path = Self::config_path()?;
                if config_path.exists() {
                    let contents = fs::read_to_string(&config_path).context(format!(
                        "Failed to read config file: {}",
                        config_path.display()
                    ))?;
                    toml::from_str(&contents).context(format!(
                        "Failed to parse config file: {}",
                        config_path.display()
                    ))
                } else {
                    let config = Self::default();
                    config.save()?;
                    Ok(config)
                }
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .context(format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(veritee_home().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: VeriteeConfig = toml::from_str("").unwrap();

        assert_eq!(config.work_dir, PathBuf::from("blocks"));
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.stop_at_first_failure);
        assert!(config.program.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "work_dir = \"/var/lib/veritee/work\"\nstop_at_first_failure = false"
        )
        .unwrap();

        let config = VeriteeConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.work_dir, PathBuf::from("/var/lib/veritee/work"));
        assert!(!config.stop_at_first_failure);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = VeriteeConfig::load(Some(Path::new("/nonexistent/veritee.toml")));
        assert!(result.is_err());
    }
}
