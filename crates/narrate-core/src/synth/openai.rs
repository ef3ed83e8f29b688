//! OpenAI-compatible `/audio/speech` client

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{validate_utterance, AudioStream, SpeechSynthesizer};
use crate::audio::AudioFormat;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::text::Utterance;
use crate::voice::VoiceCatalog;

/// Request body for the speech endpoint
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// HTTP speech synthesizer
pub struct OpenAiSpeech {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    format: AudioFormat,
    voices: VoiceCatalog,
}

impl OpenAiSpeech {
    /// Build a client from config, reading the API key from the environment
    /// variable named by `api_key_env`.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            Error::ConfigError(format!("{} is not set", config.api_key_env))
        })?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/audio/speech", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
            format: config.format,
            voices: config.voice_catalog(),
        })
    }

    async fn send(&self, utterance: &Utterance) -> Result<Response> {
        validate_utterance(utterance, &self.voices)?;

        let input = utterance.input();
        let body = SpeechRequest {
            model: &self.model,
            voice: utterance.voice(),
            input: &input,
            response_format: self.format.as_str(),
        };

        info!(
            "Requesting speech: model={} voice={} chars={}",
            self.model,
            utterance.voice(),
            input.chars().count()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, self.format.content_type())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::SynthesisFailed(format!(
                "HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, utterance: &Utterance) -> Result<Bytes> {
        let response = self.send(utterance).await?;
        let bytes = response.bytes().await?;
        debug!("Received {} bytes of {}", bytes.len(), self.format);
        Ok(bytes)
    }

    async fn synthesize_stream(&self, utterance: &Utterance) -> Result<AudioStream> {
        let response = self.send(utterance).await?;
        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => yield Ok(bytes),
                    Err(e) => {
                        yield Err(Error::SynthesisFailed(format!("Stream interrupted: {}", e)));
                        break;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
