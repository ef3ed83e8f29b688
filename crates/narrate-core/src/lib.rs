//! Narrate Core - speech synthesis to files with streamed local playback
//!
//! This crate sends text to an OpenAI-compatible speech endpoint, writes the
//! audio to disk and optionally plays it with a local player.
//!
//! # Architecture
//!
//! - [`synth`]: speech backends behind the [`SpeechSynthesizer`] trait
//! - [`writer`]: buffer and incremental stream persistence
//! - [`playback`]: growth watcher, once-only trigger and player processes
//! - [`session`]: single-utterance flows tying the above together
//! - [`batch`]: the same utterance rendered with several voices
//!
//! # Example
//!
//! ```ignore
//! use narrate_core::{Narrator, NarrateConfig, OpenAiSpeech, ProcessPlayer, Utterance};
//!
//! let config = NarrateConfig::load(None)?;
//! let synth = OpenAiSpeech::from_config(&config.api)?;
//! let player = ProcessPlayer::detect(&config.playback);
//! let narrator = Narrator::new(Arc::new(synth), Arc::new(player), config.playback, config.api.format);
//!
//! let utterance = Utterance::new("Hello, world!", "alloy");
//! narrator.stream(&utterance, Path::new("narration.mp3")).await?;
//! ```

pub mod audio;
pub mod batch;
pub mod config;
pub mod error;
pub mod playback;
pub mod session;
pub mod synth;
pub mod text;
pub mod voice;
pub mod writer;

pub use audio::AudioFormat;
pub use batch::{output_path, run_batch, BatchPlan, BatchReport, SkippedVoice};
pub use config::{ApiConfig, NarrateConfig, OutputConfig, PlaybackConfig};
pub use error::{Error, Result};
pub use playback::{
    GrowthWatcher, LaunchStatus, PlaybackTrigger, Player, PlayerCommand, ProcessPlayer,
    TriggerReason, WatchOutcome, WatchState,
};
pub use session::{Mode, Narrator, RenderReport};
pub use synth::{AudioStream, OpenAiSpeech, SpeechSynthesizer};
pub use text::{Delivery, Speed, Style, TextSource, Utterance};
pub use voice::{parse_voice_list, VoiceCatalog};
