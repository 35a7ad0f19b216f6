use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub openai: OpenAiSettings,
}

/// Chunking parameters for document splitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

/// Retrieval parameters for context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Chunks retrieved per batch generation call.
    pub batch_top_k: usize,
    /// Chunks retrieved per interactive round.
    pub session_top_k: usize,
}

/// OpenAI endpoint and model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// Chat model used for quiz generation.
    pub chat_model: String,
    /// Embedding model used for the vector index.
    pub embedding_model: String,
    /// Custom API endpoint (None for the OpenAI default).
    pub endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
            openai: OpenAiSettings::default(),
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            batch_top_k: 3,
            session_top_k: 2,
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            endpoint: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/quizforge/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("quizforge"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}
