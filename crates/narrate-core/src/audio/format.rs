//! Audio encodings the speech API can return

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Supported audio response formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG layer III (default)
    #[default]
    Mp3,
    /// Opus in an Ogg container
    Opus,
    /// AAC in ADTS framing
    Aac,
    /// Lossless FLAC
    Flac,
    /// WAV (PCM)
    Wav,
    /// Raw 24 kHz 16-bit mono PCM
    Pcm,
}

impl AudioFormat {
    pub fn all() -> &'static [AudioFormat] {
        &[
            AudioFormat::Mp3,
            AudioFormat::Opus,
            AudioFormat::Aac,
            AudioFormat::Flac,
            AudioFormat::Wav,
            AudioFormat::Pcm,
        ]
    }

    /// Value of the `response_format` request field
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Pcm => "pcm",
        }
    }

    /// File extension for output artifacts
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Get content type for format
    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Opus => "audio/ogg",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Pcm => "application/octet-stream",
        }
    }

    /// Bytes that must be on disk before streamed playback starts.
    ///
    /// This is a heuristic, not a guarantee: a fixed byte count stands in for
    /// "about two seconds of audio" at the bitrate the API usually returns for
    /// each encoding. Actual bitrates vary with the voice and the network, so
    /// playback can still outrun the writer. Calibrate per deployment with
    /// `playback.min_start_bytes`.
    pub fn default_start_bytes(&self) -> u64 {
        match self {
            // ~2.5 s at 128 kbit/s
            AudioFormat::Mp3 => 40_000,
            AudioFormat::Opus => 16_000,
            AudioFormat::Aac => 32_000,
            AudioFormat::Flac => 120_000,
            // 24 kHz * 2 bytes * 2 s, plus the header for wav
            AudioFormat::Wav => 96_044,
            AudioFormat::Pcm => 96_000,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        AudioFormat::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == needle)
            .ok_or_else(|| Error::ConfigError(format!("Unsupported audio format: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!(" flac ".parse::<AudioFormat>().unwrap(), AudioFormat::Flac);
        assert!("ogg".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_mp3_threshold() {
        assert_eq!(AudioFormat::Mp3.default_start_bytes(), 40_000);
        assert_eq!(AudioFormat::Mp3.content_type(), "audio/mpeg");
    }
}
