use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKPULSE_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the default data directory; `TASKPULSE_DATA_DIR` wins over both.
    pub data_dir: Option<PathBuf>,
    pub listen: String,
    /// Refuse to mark a task `Done` while it still has open subtasks.
    pub strict_completion: bool,
    pub model: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            listen: "127.0.0.1:9002".to_string(),
            strict_completion: false,
            model: ModelConfig::default(),
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> Result<PathBuf, AppError> {
        if std::env::var_os(json_store::DATA_DIR_ENV).is_none()
            && let Some(dir) = &self.data_dir
        {
            return Ok(dir.clone());
        }
        json_store::default_data_dir()
    }
}

/// Any endpoint that speaks the OpenAI chat completions and audio
/// transcription APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub transcription_model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Language the model is asked to answer in.
    pub language: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            transcription_model: "whisper-1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            language: "English".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub listen: Option<String>,
    pub strict_completion: Option<bool>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub transcription_model: Option<String>,
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
    pub language: Option<String>,
}

impl ConfigOverrides {
    /// Records one `KEY=VALUE` override. Model settings use a `model.` prefix.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let value = value.trim();
        match key.trim() {
            "data_dir" => self.data_dir = Some(PathBuf::from(value)),
            "listen" => self.listen = Some(value.to_string()),
            "strict_completion" => {
                let parsed = value.parse().map_err(|_| {
                    AppError::invalid_input(format!(
                        "strict_completion expects true or false, got {value}"
                    ))
                })?;
                self.strict_completion = Some(parsed);
            }
            "model.base_url" => self.base_url = Some(value.to_string()),
            "model.model" => self.model = Some(value.to_string()),
            "model.transcription_model" => self.transcription_model = Some(value.to_string()),
            "model.api_key_env" => self.api_key_env = Some(value.to_string()),
            "model.timeout_secs" => {
                let parsed = value.parse().map_err(|_| {
                    AppError::invalid_input(format!(
                        "model.timeout_secs expects seconds, got {value}"
                    ))
                })?;
                self.timeout_secs = Some(parsed);
            }
            "model.language" => self.language = Some(value.to_string()),
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown config key: {other}"
                )));
            }
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskpulse")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskpulse")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    if config.model.timeout_secs == 0 {
        return Err(AppError::invalid_data("model.timeout_secs must be positive"));
    }
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(data_dir) = &overrides.data_dir {
        merged.data_dir = Some(data_dir.clone());
    }
    if let Some(listen) = &overrides.listen {
        merged.listen = listen.clone();
    }
    if let Some(strict) = overrides.strict_completion {
        merged.strict_completion = strict;
    }

    let model = &mut merged.model;
    if let Some(base_url) = &overrides.base_url {
        model.base_url = base_url.clone();
    }
    if let Some(name) = &overrides.model {
        model.model = name.clone();
    }
    if let Some(name) = &overrides.transcription_model {
        model.transcription_model = name.clone();
    }
    if let Some(env) = &overrides.api_key_env {
        model.api_key_env = env.clone();
    }
    if let Some(timeout) = overrides.timeout_secs {
        model.timeout_secs = timeout.max(1);
    }
    if let Some(language) = &overrides.language {
        model.language = language.clone();
    }

    merged
}
