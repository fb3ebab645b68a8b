use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// OpenAI speech-to-text and chat settings
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Assignment and submission storage
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Word alignment options
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, audio uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// OpenAI service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (optional, for Azure OpenAI or self-hosted)
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Model used for coaching feedback
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for speech-to-text
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Temperature for coaching feedback (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            chat_model: default_chat_model(),
            transcription_model: default_transcription_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// SQLite file path; the user data directory is used when absent
    #[serde(default)]
    pub path: Option<String>,
}

impl DatabaseConfig {
    /// Configured database path, if any
    pub fn path_buf(&self) -> Option<PathBuf> {
        self.path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}

/// Word alignment configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AlignmentConfig {
    /// Skip very frequent transcript words as match seeds once the transcript
    /// reaches 200 words
    #[serde(default)]
    pub popular_word_heuristic: bool,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024 // Whisper's upload limit
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load the configuration from a JSON file, writing defaults if it is missing
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {:?}", config_path))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", config_path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(anyhow!("Maximum upload size must be greater than 0"));
        }

        url::Url::parse(&self.openai.endpoint)
            .map_err(|e| anyhow!("Invalid OpenAI endpoint '{}': {}", self.openai.endpoint, e))?;

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.openai.temperature
            ));
        }

        if self.openai.timeout_secs == 0 {
            return Err(anyhow!("OpenAI timeout must be greater than 0"));
        }

        // Evaluation and storage work without a key; only the AI routes need it
        if self.openai.api_key.is_empty() {
            warn!("No OpenAI API key configured; transcription will fail and coaching will use fallback feedback");
        }

        Ok(())
    }
}
