//! Configuration types for narrate
//!
//! Settings are layered: serde defaults, then an optional TOML file, then
//! `NARRATE_<SECTION>__<KEY>` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::audio::AudioFormat;
use crate::error::{Error, Result};
use crate::voice::VoiceCatalog;

const ENV_PREFIX: &str = "NARRATE";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrateConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl NarrateConfig {
    /// Load configuration from `path` (or the default location) and the
    /// process environment. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`NarrateConfig::load`], reading environment overrides from
    /// `env` instead of the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        let file = path.map(Path::to_path_buf).or_else(default_config_path);
        if let Some(file) = file {
            debug!("Reading configuration from {:?}", file);
            builder = builder.add_source(
                config::File::from(file)
                    .format(config::FileFormat::Toml)
                    .required(path.is_some()),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("api.known_voices")
                .with_list_parse_key("output.batch_voices")
                .with_list_parse_key("playback.player_args")
                .source(env),
        );

        let settings = builder.build()?;
        let config: Self = settings.try_deserialize()?;
        config.playback.validate()?;
        Ok(config)
    }
}

/// Default config file location: `<config_dir>/narrate/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("narrate").join("config.toml"))
}

/// Speech API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Speech model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Audio encoding requested from the API
    #[serde(default)]
    pub format: AudioFormat,

    /// TCP connect timeout; the request itself is unbounded
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Allow-list of voice identifiers
    #[serde(default = "default_known_voices")]
    pub known_voices: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            format: AudioFormat::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            known_voices: default_known_voices(),
        }
    }
}

impl ApiConfig {
    pub fn voice_catalog(&self) -> VoiceCatalog {
        VoiceCatalog::new(self.known_voices.iter().cloned())
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini-tts".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_known_voices() -> Vec<String> {
    [
        "alloy", "ash", "ballad", "coral", "echo", "fable", "nova", "onyx", "sage", "shimmer",
        "verse",
    ]
    .iter()
    .map(|v| v.to_string())
    .collect()
}

/// Streamed playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Primary player program; auto-detected from `PATH` when unset
    #[serde(default)]
    pub player: Option<String>,

    /// Arguments placed before the file path when `player` is set
    #[serde(default)]
    pub player_args: Vec<String>,

    /// "Open with default handler" program; platform default when unset
    #[serde(default)]
    pub opener: Option<String>,

    /// Bytes on disk before playback starts; per-format default when unset
    #[serde(default)]
    pub min_start_bytes: Option<u64>,

    /// Delay between file size polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Poll budget before falling back to playing whatever exists
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player: None,
            player_args: Vec::new(),
            opener: None,
            min_start_bytes: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

impl PlaybackConfig {
    pub fn start_bytes(&self, format: AudioFormat) -> u64 {
        self.min_start_bytes
            .unwrap_or_else(|| format.default_start_bytes())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// A zero poll budget would time out before the first size check.
    pub fn validate(&self) -> Result<()> {
        if self.max_polls == 0 {
            return Err(Error::ConfigError(
                "playback.max_polls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_polls() -> u32 {
    600
}

/// Output location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output path for single utterances
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Output directory for batch runs
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,

    /// File name prefix for batch runs
    #[serde(default = "default_basename")]
    pub basename: String,

    /// Voice used for single utterances
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Voices used by batch runs when none are given
    #[serde(default = "default_batch_voices")]
    pub batch_voices: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            outdir: default_outdir(),
            basename: default_basename(),
            voice: default_voice(),
            batch_voices: default_batch_voices(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("narration.mp3")
}

fn default_outdir() -> PathBuf {
    PathBuf::from("voices_out")
}

fn default_basename() -> String {
    "take".to_string()
}

fn default_voice() -> String {
    "alloy".to_string()
}

fn default_batch_voices() -> Vec<String> {
    vec!["alloy".to_string(), "verse".to_string(), "coral".to_string()]
}
