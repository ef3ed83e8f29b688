//! Utterance text and prompt-based delivery effects

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Where the text to speak comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    Inline(String),
    File(PathBuf),
}

impl TextSource {
    /// Build a source from the two mutually optional CLI inputs. A file wins
    /// over inline text when both are given.
    pub fn from_args(text: Option<String>, text_file: Option<PathBuf>) -> Result<Self> {
        match (text, text_file) {
            (_, Some(path)) => Ok(TextSource::File(path)),
            (Some(text), None) => Ok(TextSource::Inline(text)),
            (None, None) => Err(Error::InvalidInput(
                "Provide --text or --text-file".to_string(),
            )),
        }
    }

    /// Read the text, trimmed of surrounding whitespace. Empty text is
    /// rejected.
    pub fn read(&self) -> Result<String> {
        let raw = match self {
            TextSource::Inline(text) => text.clone(),
            TextSource::File(path) => read_text_file(path)?,
        };

        let text = raw.trim();
        if text.is_empty() {
            return Err(Error::InvalidInput("Text to speak is empty".to_string()));
        }
        Ok(text.to_string())
    }
}

fn read_text_file(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("Cannot read text file {:?}: {}", path, e))
    })?;
    debug!("Read {} bytes of text from {:?}", text.len(), path);
    Ok(text)
}

/// Delivery style prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Neutral,
    News,
    Whisper,
    Dramatic,
}

impl Style {
    pub fn prompt(&self) -> &'static str {
        match self {
            Style::Neutral => "Read in a clear, neutral studio voice.",
            Style::News => "Read like a concise news anchor, confident and authoritative.",
            Style::Whisper => "Read softly, with a hushed, intimate tone.",
            Style::Dramatic => "Read with dramatic pacing and emphasis, cinematic style.",
        }
    }
}

/// Pace prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub fn prompt(&self) -> &'static str {
        match self {
            Speed::Slow => "Keep a measured, slower pace with clear pauses.",
            Speed::Normal => "Use a natural, conversational pace.",
            Speed::Fast => "Use a quicker pace while staying intelligible.",
        }
    }
}

/// Optional style and speed annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    pub style: Option<Style>,
    pub speed: Option<Speed>,
}

impl Delivery {
    pub fn new(style: Option<Style>, speed: Option<Speed>) -> Self {
        Self { style, speed }
    }

    /// Prompt prefix, or `None` when no effect is selected
    pub fn prefix(&self) -> Option<String> {
        let parts: Vec<&str> = [
            self.style.map(|s| s.prompt()),
            self.speed.map(|s| s.prompt()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Text plus synthesis parameters for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    voice: String,
    delivery: Delivery,
}

impl Utterance {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            delivery: Delivery::default(),
        }
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Same text and delivery, different voice
    pub fn for_voice(&self, voice: impl Into<String>) -> Self {
        Self {
            text: self.text.clone(),
            voice: voice.into(),
            delivery: self.delivery,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    /// The request input: delivery prompt, a blank line, then the text.
    pub fn input(&self) -> String {
        match self.delivery.prefix() {
            Some(prefix) => format!("{}\n\n{}", prefix, self.text),
            None => self.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_text_is_trimmed_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.txt");
        std::fs::write(&path, "\n  Hello there.\nSecond line.  \n\n").unwrap();

        let text = TextSource::File(path).read().unwrap();
        assert_eq!(text, "Hello there.\nSecond line.");

        let utterance = Utterance::new(text.clone(), "alloy");
        assert_eq!(utterance.input(), text);
    }

    #[test]
    fn test_missing_text_is_invalid_input() {
        let err = TextSource::from_args(None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = TextSource::Inline("   ".to_string()).read().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_file_wins_over_inline() {
        let source =
            TextSource::from_args(Some("inline".into()), Some(PathBuf::from("a.txt"))).unwrap();
        assert_eq!(source, TextSource::File(PathBuf::from("a.txt")));
    }

    #[test]
    fn test_delivery_prefix() {
        let utterance = Utterance::new("Breaking.", "verse")
            .with_delivery(Delivery::new(Some(Style::News), Some(Speed::Fast)));
        assert_eq!(
            utterance.input(),
            "Read like a concise news anchor, confident and authoritative. \
             Use a quicker pace while staying intelligible.\n\nBreaking."
        );

        let style_only = Delivery::new(Some(Style::Whisper), None);
        assert_eq!(
            style_only.prefix().as_deref(),
            Some("Read softly, with a hushed, intimate tone.")
        );
        assert_eq!(Delivery::default().prefix(), None);
    }
}
