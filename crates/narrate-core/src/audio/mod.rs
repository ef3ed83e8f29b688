//! Audio output formats

mod format;

pub use format::AudioFormat;
