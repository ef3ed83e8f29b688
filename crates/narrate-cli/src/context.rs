//! Components chosen once at startup

use narrate_core::{NarrateConfig, Narrator, OpenAiSpeech, ProcessPlayer, Result};
use std::sync::Arc;

/// Shared application context
pub struct AppContext {
    pub narrator: Narrator,
}

impl AppContext {
    pub fn new(config: &NarrateConfig) -> Result<Self> {
        let synth = OpenAiSpeech::from_config(&config.api)?;
        let player = ProcessPlayer::detect(&config.playback);
        let narrator = Narrator::new(
            Arc::new(synth),
            Arc::new(player),
            config.playback.clone(),
            config.api.format,
        );

        Ok(Self { narrator })
    }
}
