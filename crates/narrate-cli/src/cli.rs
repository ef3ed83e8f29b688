//! Command-line surface

use clap::{Args, Parser, Subcommand, ValueEnum};
use narrate_core::{Delivery, Mode, Speed, Style, TextSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Text-to-speech into audio files, with streamed local playback", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Speak one utterance with one voice
    Say(SayArgs),

    /// Render the same text with several voices
    Batch(BatchArgs),

    /// List known voices
    Voices,

    /// Report whether the API key is available
    Check,

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Inline text to speak
    #[arg(long)]
    pub text: Option<String>,

    /// Path to a UTF-8 text file to read
    #[arg(long)]
    pub text_file: Option<PathBuf>,
}

impl TextArgs {
    pub fn source(&self) -> narrate_core::Result<TextSource> {
        TextSource::from_args(self.text.clone(), self.text_file.clone())
    }
}

#[derive(Args, Debug)]
pub struct SayArgs {
    #[command(flatten)]
    pub text: TextArgs,

    /// Voice to use (default from config)
    #[arg(long)]
    pub voice: Option<String>,

    /// save = write only; stream = play while writing; play = write then play
    #[arg(long, value_enum, default_value_t = ModeArg::Stream)]
    pub mode: ModeArg,

    /// Delivery style effect
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// Pace effect
    #[arg(long, value_enum)]
    pub speed: Option<SpeedArg>,

    /// Output file (default from config)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[command(flatten)]
    pub text: TextArgs,

    /// Comma-separated voices (default from config)
    #[arg(long)]
    pub voices: Option<String>,

    /// save = write files only; stream = write and play each
    #[arg(long, value_enum, default_value_t = BatchModeArg::Save)]
    pub mode: BatchModeArg,

    /// Delivery style effect
    #[arg(long, value_enum, default_value_t = StyleArg::Neutral)]
    pub style: StyleArg,

    /// Pace effect
    #[arg(long, value_enum, default_value_t = SpeedArg::Normal)]
    pub speed: SpeedArg,

    /// Output directory (default from config)
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Base filename (default from config)
    #[arg(long)]
    pub basename: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Save,
    Stream,
    Play,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Save => Mode::Save,
            ModeArg::Stream => Mode::Stream,
            ModeArg::Play => Mode::Play,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchModeArg {
    Save,
    Stream,
}

impl From<BatchModeArg> for Mode {
    fn from(m: BatchModeArg) -> Self {
        match m {
            BatchModeArg::Save => Mode::Save,
            BatchModeArg::Stream => Mode::Stream,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    Neutral,
    News,
    Whisper,
    Dramatic,
}

impl From<StyleArg> for Style {
    fn from(s: StyleArg) -> Self {
        match s {
            StyleArg::Neutral => Style::Neutral,
            StyleArg::News => Style::News,
            StyleArg::Whisper => Style::Whisper,
            StyleArg::Dramatic => Style::Dramatic,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedArg {
    Slow,
    Normal,
    Fast,
}

impl From<SpeedArg> for Speed {
    fn from(s: SpeedArg) -> Self {
        match s {
            SpeedArg::Slow => Speed::Slow,
            SpeedArg::Normal => Speed::Normal,
            SpeedArg::Fast => Speed::Fast,
        }
    }
}

impl SayArgs {
    pub fn delivery(&self) -> Delivery {
        Delivery::new(self.style.map(Into::into), self.speed.map(Into::into))
    }
}

impl BatchArgs {
    pub fn delivery(&self) -> Delivery {
        Delivery::new(Some(self.style.into()), Some(self.speed.into()))
    }
}
