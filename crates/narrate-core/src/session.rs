//! Single-utterance flows: save, save then play, and streamed playback

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::audio::AudioFormat;
use crate::config::PlaybackConfig;
use crate::error::Result;
use crate::playback::{
    GrowthWatcher, LaunchStatus, PlaybackTrigger, Player, TriggerReason, WatchOutcome,
};
use crate::synth::{AudioStream, SpeechSynthesizer};
use crate::text::Utterance;
use crate::writer;

/// How an utterance is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Write the file only
    #[default]
    Save,
    /// Stream to the file and start playback while it is still being written
    Stream,
    /// Write the file, then play it
    Play,
}

/// What happened to one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub voice: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub trigger: Option<TriggerReason>,
    /// File size the watcher saw when it triggered
    pub observed_bytes: Option<u64>,
    pub launch: Option<LaunchStatus>,
}

/// Runs utterances through a synthesizer and, optionally, a player.
///
/// Both collaborators are chosen at startup and shared.
pub struct Narrator {
    synth: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn Player>,
    playback: PlaybackConfig,
    format: AudioFormat,
}

impl Narrator {
    pub fn new(
        synth: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn Player>,
        playback: PlaybackConfig,
        format: AudioFormat,
    ) -> Self {
        Self {
            synth,
            player,
            playback,
            format,
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub async fn render(
        &self,
        mode: Mode,
        utterance: &Utterance,
        path: &Path,
    ) -> Result<RenderReport> {
        match mode {
            Mode::Save => self.save(utterance, path).await,
            Mode::Stream => self.stream(utterance, path).await,
            Mode::Play => self.save_and_play(utterance, path).await,
        }
    }

    /// Synthesize in one piece and write the file.
    pub async fn save(&self, utterance: &Utterance, path: &Path) -> Result<RenderReport> {
        let audio = self.synth.synthesize(utterance).await?;
        let bytes = writer::write_bytes(path, &audio).await?;
        info!("Wrote {} ({} bytes)", path.display(), bytes);

        Ok(RenderReport {
            voice: utterance.voice().to_string(),
            path: path.to_path_buf(),
            bytes,
            trigger: None,
            observed_bytes: None,
            launch: None,
        })
    }

    /// Save, then hand the complete file to the player.
    pub async fn save_and_play(&self, utterance: &Utterance, path: &Path) -> Result<RenderReport> {
        let mut report = self.save(utterance, path).await?;
        let trigger = PlaybackTrigger::new(self.player.clone());
        report.launch = Some(trigger.fire(path));
        Ok(report)
    }

    /// Drain the streamed response to `path` while a watcher starts playback
    /// once enough of the file exists.
    pub async fn stream(&self, utterance: &Utterance, path: &Path) -> Result<RenderReport> {
        let stream = self.synth.synthesize_stream(utterance).await?;
        let (written, outcome) = self.drain_watched(stream, path).await?;
        let bytes = written?;
        info!("Streamed {} ({} bytes)", path.display(), bytes);

        let (trigger, observed_bytes, launch) = match outcome {
            WatchOutcome::Triggered {
                reason,
                observed_bytes,
                launch,
                ..
            } => (Some(reason), observed_bytes, Some(launch)),
            WatchOutcome::Cancelled { .. } => (None, None, None),
        };

        Ok(RenderReport {
            voice: utterance.voice().to_string(),
            path: path.to_path_buf(),
            bytes,
            trigger,
            observed_bytes,
            launch,
        })
    }

    /// Run the writer and the watcher side by side.
    ///
    /// The file is truncated before the watcher starts, so only bytes from
    /// this response are ever measured. A failed write cancels the watcher;
    /// the write result is returned next to the watcher's outcome.
    async fn drain_watched(
        &self,
        stream: AudioStream,
        path: &Path,
    ) -> Result<(Result<u64>, WatchOutcome)> {
        let file = writer::create_output(path).await?;

        let trigger = Arc::new(PlaybackTrigger::new(self.player.clone()));
        let watcher = GrowthWatcher::from_config(path, &self.playback, self.format).spawn(trigger);

        match writer::drain_into(file, stream, path).await {
            Ok(bytes) => {
                watcher.writer_finished();
                Ok((Ok(bytes), watcher.wait().await))
            }
            Err(e) => {
                watcher.cancel();
                let outcome = watcher.wait().await;
                if outcome.launch() == Some(&LaunchStatus::Launched) {
                    warn!("Stream failed after playback of {} started", path.display());
                }
                Ok((Err(e), outcome))
            }
        }
    }
}
