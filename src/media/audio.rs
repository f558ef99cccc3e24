//! Narration synthesis fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::{MediaError, slide_filename};
use crate::batch::BatchRunner;
use crate::client::SpeechApi;
use crate::lecture::Slide;

/// Rough speaking rate used to estimate clip length: 150 words per minute,
/// 5 characters per word (as good as it needs to be for logging and
/// timing metadata).
const WORDS_PER_MINUTE: f64 = 150.0;
const CHARS_PER_WORD: f64 = 5.0;

/// A narration clip written to disk.
#[derive(Debug, Clone)]
pub struct NarrationClip {
    pub index: usize,
    pub path: PathBuf,
    /// Estimated spoken duration, not probed from the file.
    pub duration_secs: f64,
}

/// Estimates how long `text` takes to read aloud.
pub fn estimate_duration_secs(text: &str) -> f64 {
    let words = text.len() as f64 / CHARS_PER_WORD;
    words / WORDS_PER_MINUTE * 60.0
}

/// Synthesizes narration for each slide, `runner.max_workers()` at a time.
///
/// The returned vector is index-aligned with `slides`. A slide with empty
/// narration has nothing to synthesize: it gets an absent slot and a
/// warning, but does not count as a failure. Files are overwritten if a
/// previous run left them behind.
pub async fn synthesize_narration(
    speech_api: Arc<dyn SpeechApi>,
    slides: &[Slide],
    dir: &Path,
    runner: &BatchRunner,
) -> Result<Vec<Option<NarrationClip>>, MediaError> {
    tokio::fs::create_dir_all(dir).await?;

    let mut jobs = Vec::with_capacity(slides.len());
    for (index, slide) in slides.iter().enumerate() {
        let text = {
            let trimmed = slide.narration.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        let path = dir.join(slide_filename(index, "mp3"));
        let api = Arc::clone(&speech_api);

        jobs.push(move || async move {
            let Some(text) = text else {
                warn!(index, "slide has nothing to synthesize, skipping");
                return Ok::<_, crate::client::ClientError>(None);
            };

            let bytes = api.synthesize(&text).await?;
            tokio::fs::write(&path, &bytes).await?;
            Ok(Some(NarrationClip {
                index,
                path,
                duration_secs: estimate_duration_secs(&text),
            }))
        });
    }

    let output = runner.run(jobs).await?;
    let slots: Vec<Option<NarrationClip>> = output
        .into_slots()
        .into_iter()
        .map(Option::flatten)
        .collect();

    info!(
        requested = slots.len(),
        synthesized = slots.iter().filter(|s| s.is_some()).count(),
        "narration synthesis finished"
    );
    Ok(slots)
}
