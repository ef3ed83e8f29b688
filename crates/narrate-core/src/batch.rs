//! Sequential multi-voice rendering
//!
//! Every voice renders the same utterance into its own file. A failing voice
//! is logged and skipped so the remaining voices still run; only errors that
//! make the whole run meaningless (bad input, bad config) abort it.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::audio::AudioFormat;
use crate::error::{Error, Result};
use crate::session::{Mode, Narrator, RenderReport};
use crate::text::Utterance;

/// Voices and output naming for a batch run
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub voices: Vec<String>,
    pub outdir: PathBuf,
    pub basename: String,
    pub mode: Mode,
}

/// A voice that was skipped and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVoice {
    pub index: usize,
    pub voice: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub rendered: Vec<RenderReport>,
    pub skipped: Vec<SkippedVoice>,
}

/// `<outdir>/<basename>_<NN>_<voice>.<ext>` with a 1-based, two-digit index
pub fn output_path(
    outdir: &Path,
    basename: &str,
    index: usize,
    voice: &str,
    format: AudioFormat,
) -> PathBuf {
    outdir.join(format!(
        "{}_{:02}_{}.{}",
        basename,
        index,
        voice,
        format.extension()
    ))
}

/// Render `utterance` once per voice in `plan`.
pub async fn run_batch(
    narrator: &Narrator,
    utterance: &Utterance,
    plan: &BatchPlan,
) -> Result<BatchReport> {
    if plan.voices.is_empty() {
        return Err(Error::InvalidInput("No voices given".to_string()));
    }

    tokio::fs::create_dir_all(&plan.outdir)
        .await
        .map_err(|e| Error::write_failed(&plan.outdir, e))?;

    info!(
        "Rendering {} voices ({:?}) into {}",
        plan.voices.len(),
        plan.mode,
        plan.outdir.display()
    );

    let mut report = BatchReport::default();
    for (i, voice) in plan.voices.iter().enumerate() {
        let index = i + 1;
        let path = output_path(&plan.outdir, &plan.basename, index, voice, narrator.format());
        info!("{} -> {}", voice, path.display());

        match narrator
            .render(plan.mode, &utterance.for_voice(voice.as_str()), &path)
            .await
        {
            Ok(rendered) => report.rendered.push(rendered),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Skipped {} due to error: {}", voice, e);
                report.skipped.push(SkippedVoice {
                    index,
                    voice: voice.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch done: {} rendered, {} skipped",
        report.rendered.len(),
        report.skipped.len()
    );
    Ok(report)
}
