//! call-speech configuration management.

use anyhow::{Context, Result};
use call_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ssml::{DEFAULT_PROSODY_RATE, DEFAULT_STYLE_DEGREE};
use crate::text::DEFAULT_MAX_CHUNK_LENGTH;

// Recognition defaults: callers often pause mid-sentence, menus need time to decide
const DEFAULT_END_SILENCE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_CHOICE_SILENCE_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub resources: ResourcesConfig,

    #[serde(default)]
    pub sounds: SoundsConfig,

    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// Publicly reachable resources (lexicon, sounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Base URL hosting lexicon.xml and the default sounds
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundsConfig {
    /// Tone played before listening; defaults to {public_url}/ready.wav
    #[serde(default)]
    pub ready: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Chunk size in characters that triggers a new TTS request
    #[serde(default = "default_max_chunk_length")]
    pub max_chunk_length: usize,

    /// Style intensity (0.01-2.0)
    #[serde(default = "default_style_degree")]
    pub style_degree: f32,

    /// Speaking rate (0.5-2.0)
    #[serde(default = "default_prosody_rate")]
    pub prosody_rate: f32,

    /// Escape markup characters in spoken text
    #[serde(default = "default_escape_text")]
    pub escape_text: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Silence that ends a free speech answer
    #[serde(default = "default_end_silence_timeout_secs")]
    pub end_silence_timeout_secs: u64,

    /// Silence that ends a menu choice
    #[serde(default = "default_choice_silence_timeout_secs")]
    pub choice_silence_timeout_secs: u64,
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_CHUNK_LENGTH
}

fn default_style_degree() -> f32 {
    DEFAULT_STYLE_DEGREE
}

fn default_prosody_rate() -> f32 {
    DEFAULT_PROSODY_RATE
}

fn default_escape_text() -> bool {
    true
}

fn default_end_silence_timeout_secs() -> u64 {
    DEFAULT_END_SILENCE_TIMEOUT_SECS
}

fn default_choice_silence_timeout_secs() -> u64 {
    DEFAULT_CHOICE_SILENCE_TIMEOUT_SECS
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            max_chunk_length: default_max_chunk_length(),
            style_degree: default_style_degree(),
            prosody_rate: default_prosody_rate(),
            escape_text: default_escape_text(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            end_silence_timeout_secs: default_end_silence_timeout_secs(),
            choice_silence_timeout_secs: default_choice_silence_timeout_secs(),
        }
    }
}

impl RecognitionConfig {
    pub fn end_silence_timeout(&self) -> Duration {
        Duration::from_secs(self.end_silence_timeout_secs)
    }

    pub fn choice_silence_timeout(&self) -> Duration {
        Duration::from_secs(self.choice_silence_timeout_secs)
    }
}

impl SpeechConfig {
    /// Get the config file path: ~/.config/call-speech/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("HOME is not set")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("call-speech")
            .join("config.toml"))
    }

    /// Load config from the default location, returning default if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from a file, returning default if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SpeechConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// URL of the tone played before listening to the caller
    pub fn ready_sound_url(&self) -> String {
        match &self.sounds.ready {
            Some(url) => url.clone(),
            None => format!("{}/ready.wav", self.lexicon_base_url()),
        }
    }

    /// Base URL the lexicon is served from
    pub fn lexicon_base_url(&self) -> &str {
        self.resources.public_url.trim_end_matches('/')
    }
}
