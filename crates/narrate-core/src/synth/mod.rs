//! Speech synthesis backends
//!
//! A [`SpeechSynthesizer`] turns an [`Utterance`] into audio bytes, either as
//! one buffer or as a stream of chunks that arrive while the remote side is
//! still generating. The backend is chosen once at startup and shared as a
//! trait object.

mod openai;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::{Error, Result};
use crate::text::Utterance;
use crate::voice::VoiceCatalog;

pub use openai::OpenAiSpeech;

/// Incremental audio response
pub type AudioStream = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize the whole utterance into memory.
    async fn synthesize(&self, utterance: &Utterance) -> Result<Bytes>;

    /// Start synthesis and return the response body as it arrives.
    async fn synthesize_stream(&self, utterance: &Utterance) -> Result<AudioStream>;
}

/// Checks shared by every backend, run before any network I/O.
pub fn validate_utterance(utterance: &Utterance, voices: &VoiceCatalog) -> Result<()> {
    if utterance.text().trim().is_empty() {
        return Err(Error::InvalidInput("Text to speak is empty".to_string()));
    }
    voices.validate(utterance.voice())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use futures::StreamExt;
    use std::time::Duration;

    /// In-memory synthesizer producing fixed-size chunks.
    pub(crate) struct FakeSpeech {
        pub voices: VoiceCatalog,
        pub chunk: usize,
        pub chunks: usize,
        pub delay: Duration,
        pub failing_voices: Vec<String>,
        pub interrupt_after: Option<usize>,
    }

    impl FakeSpeech {
        pub fn new(chunk: usize, chunks: usize) -> Self {
            Self {
                voices: VoiceCatalog::new(["alloy", "verse", "coral", "bad-voice"]),
                chunk,
                chunks,
                delay: Duration::ZERO,
                failing_voices: Vec::new(),
                interrupt_after: None,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn failing(mut self, voice: &str) -> Self {
            self.failing_voices.push(voice.to_string());
            self
        }

        /// Fail the stream after `chunks` chunks have been sent.
        pub fn interrupted_after(mut self, chunks: usize) -> Self {
            self.interrupt_after = Some(chunks);
            self
        }

        fn check(&self, utterance: &Utterance) -> Result<()> {
            validate_utterance(utterance, &self.voices)?;
            if self.failing_voices.iter().any(|v| v == utterance.voice()) {
                return Err(Error::SynthesisFailed(format!(
                    "HTTP 500: voice {} unavailable",
                    utterance.voice()
                )));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, utterance: &Utterance) -> Result<Bytes> {
            self.check(utterance)?;
            Ok(Bytes::from(vec![0xAB; self.chunk * self.chunks]))
        }

        async fn synthesize_stream(&self, utterance: &Utterance) -> Result<AudioStream> {
            self.check(utterance)?;
            let (chunk, chunks, delay) = (self.chunk, self.chunks, self.delay);
            let interrupt_after = self.interrupt_after;
            let stream = async_stream::stream! {
                for i in 0..chunks {
                    if interrupt_after == Some(i) {
                        yield Err::<Bytes, Error>(Error::SynthesisFailed(
                            "Stream interrupted: reset".to_string(),
                        ));
                        break;
                    }
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    yield Ok::<_, Error>(Bytes::from(vec![0xAB; chunk]));
                }
            };
            Ok(stream.boxed())
        }
    }
}
