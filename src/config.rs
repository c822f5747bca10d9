use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const BACKENDS: &[&str] = &["auto", "gemini", "mock"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("backend \"gemini\" needs an API key (set ai.api_key or ${0})")]
    MissingApiKey(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Overrides the platform data dir; not persisted.
    #[serde(skip)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_question_count")]
    pub question_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Which gateway implementation the app runs against, decided once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendChoice {
    Gemini { api_key: String },
    Mock,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_backend() -> String {
    "auto".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_question_count() -> usize {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            ai: AiConfig::default(),
            quiz: QuizConfig::default(),
            log: LogConfig::default(),
            data_dir: None,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Record a theme choice in the file at `path`. Only `theme` changes;
    /// the in-memory config may carry command-line overrides that must not
    /// be written back.
    pub fn persist_theme(path: &Path, theme: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.theme = theme.to_string();
        on_disk.save_to(path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("k53prep")
            .join("config.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("k53prep")
        })
    }

    /// Clamp out-of-range values and reset unknown keys to defaults.
    /// Call after deserialization to handle hand-edited config files.
    pub fn validate(&mut self) {
        self.quiz.question_count = self.quiz.question_count.clamp(1, 50);
        self.ai.timeout_secs = self.ai.timeout_secs.clamp(5, 600);
        if !BACKENDS.contains(&self.ai.backend.as_str()) {
            self.ai.backend = default_backend();
        }
    }

    /// Resolve the API key: explicit config value first, then the configured
    /// environment variable, then the legacy `API_KEY`. Blank values at any
    /// step fall through to the next source.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        self.ai
            .api_key
            .clone()
            .filter(present)
            .or_else(|| env(&self.ai.api_key_env).filter(present))
            .or_else(|| env("API_KEY").filter(present))
    }

    pub fn backend_choice(&self) -> Result<BackendChoice, ConfigError> {
        self.choose_backend(self.resolve_api_key())
    }

    fn choose_backend(&self, api_key: Option<String>) -> Result<BackendChoice, ConfigError> {
        match (self.ai.backend.as_str(), api_key) {
            ("mock", _) => Ok(BackendChoice::Mock),
            ("gemini", Some(api_key)) => Ok(BackendChoice::Gemini { api_key }),
            ("gemini", None) => Err(ConfigError::MissingApiKey(self.ai.api_key_env.clone())),
            (_, Some(api_key)) => Ok(BackendChoice::Gemini { api_key }),
            (_, None) => Ok(BackendChoice::Mock),
        }
    }
}
