//! Process configuration, built once at startup and passed to every
//! component that needs it.
//!
//! Nothing in the crate reads the environment at call time; the binary
//! loads `.env`, constructs a [`Config`], and hands references (or `Arc`s)
//! down. Defaults mirror the hosted services the pipeline targets.

use std::env;
use thiserror::Error;

use crate::batch::DEFAULT_MAX_WORKERS;

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";
pub const DEFAULT_TTS_VOICE: &str = "alloy";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} environment variable not set")]
    MissingVar { name: &'static str },

    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the pipeline needs to talk to its collaborator services.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key, used for both chat completions and speech synthesis.
    pub openai_api_key: String,
    /// Base URL for the OpenAI-compatible API.
    pub openai_api_base: String,
    /// Chat model used for objectives, slide planning and slide content.
    pub openai_model: String,
    /// Speech model for narration synthesis.
    pub tts_model: String,
    /// Narration voice.
    pub tts_voice: String,
    /// Gemini API key, used for slide image generation.
    pub gemini_api_key: String,
    /// Gemini model that returns inline image data.
    pub gemini_image_model: String,
    /// Worker bound shared by both media fan-outs.
    pub max_workers: usize,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Required: `OPENAI_API_KEY`, `GEMINI_API_KEY`. Everything else falls
    /// back to a sensible default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = require("OPENAI_API_KEY")?;
        let gemini_api_key = require("GEMINI_API_KEY")?;

        let max_workers = match env::var("AMPORA_MAX_WORKERS") {
            Ok(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|w| *w >= 1)
                .ok_or_else(|| ConfigError::InvalidVar {
                    name: "AMPORA_MAX_WORKERS",
                    value: raw,
                    reason: "expected an integer >= 1".to_string(),
                })?,
            Err(_) => DEFAULT_MAX_WORKERS,
        };

        Ok(Self {
            openai_api_key,
            openai_api_base: var_or("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE),
            openai_model: var_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            tts_model: var_or("OPENAI_TTS_MODEL", DEFAULT_TTS_MODEL),
            tts_voice: var_or("OPENAI_TTS_VOICE", DEFAULT_TTS_VOICE),
            gemini_api_key,
            gemini_image_model: var_or("GEMINI_IMAGE_MODEL", DEFAULT_GEMINI_IMAGE_MODEL),
            max_workers,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar { name })
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
