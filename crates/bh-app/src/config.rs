//! Application configuration, stored as YAML.

use std::path::{Path, PathBuf};

use bh_api::{ApiConfig, HttpApiClient};
use bh_results::MissingMetricPolicy;
use bh_session::Session;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::download::DirectorySink;
use crate::error::{AppError, AppResult};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "benchmark-health.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// Directory holding the persisted session.
    pub state_dir: PathBuf,
    /// Where downloaded reports are written.
    pub download_dir: PathBuf,
    pub missing_metrics: MissingMetricPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            state_dir: PathBuf::from(".benchmark-health"),
            download_dir: PathBuf::from("."),
            missing_metrics: MissingMetricPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn session(&self) -> Session {
        Session::persistent(&self.state_dir)
    }

    pub fn api_client(&self) -> AppResult<HttpApiClient> {
        Ok(HttpApiClient::new(&self.api)?)
    }

    pub fn download_sink(&self) -> DirectorySink {
        DirectorySink::new(&self.download_dir)
    }
}

/// Load configuration from a YAML file.
pub fn load_config(path: &Path) -> AppResult<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: AppConfig = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;

    Ok(config)
}

/// Load an explicit config file, or [`DEFAULT_CONFIG_FILE`] if it exists, or defaults.
pub fn load_config_or_default(path: Option<&Path>) -> AppResult<AppConfig> {
    if let Some(path) = path {
        return load_config(path);
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file() {
        load_config(fallback)
    } else {
        debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
        Ok(AppConfig::default())
    }
}

/// Save configuration to a YAML file.
pub fn save_config(path: &Path, config: &AppConfig) -> AppResult<()> {
    let content = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "api:\n  base_url: http://eval.internal:9000\nmissing_metrics: exclude\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "http://eval.internal:9000");
        assert_eq!(config.api.timeout_s, None);
        assert_eq!(config.missing_metrics, MissingMetricPolicy::Exclude);
        assert_eq!(config.state_dir, PathBuf::from(".benchmark-health"));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = serde_yaml::from_str::<AppConfig>("missing_metrics: ignore\n");
        assert!(err.is_err());
    }

    #[test]
    fn save_then_load() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("bh-config-{nanos}.yaml"));

        let mut config = AppConfig::default();
        config.api.timeout_s = Some(30);
        config.download_dir = PathBuf::from("reports");
        save_config(&path, &config).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/bh.yaml"))).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }
}
