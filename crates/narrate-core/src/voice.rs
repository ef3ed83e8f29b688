//! Allow-list of voice identifiers

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    known: Vec<String>,
}

impl VoiceCatalog {
    pub fn new<I, S>(voices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: voices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, voice: &str) -> bool {
        self.known.iter().any(|v| v == voice)
    }

    pub fn validate(&self, voice: &str) -> Result<()> {
        if self.contains(voice) {
            Ok(())
        } else {
            Err(Error::InvalidVoice {
                voice: voice.to_string(),
                known: self.known.join(", "),
            })
        }
    }

    pub fn voices(&self) -> &[String] {
        &self.known
    }
}

/// Split a comma-separated voice list, dropping blanks.
pub fn parse_voice_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
