//! Slide image rendering fan-out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::{MediaError, slide_filename};
use crate::batch::BatchRunner;
use crate::client::ImageApi;
use crate::lecture::Slide;
use crate::prompt::Prompts;

/// A slide image written to disk.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub index: usize,
    pub path: PathBuf,
}

/// Renders one image per slide, `runner.max_workers()` at a time.
///
/// The returned vector is index-aligned with `slides`; an absent slot means
/// that slide's rendering failed and was skipped. Files are overwritten if
/// a previous run left them behind.
pub async fn render_images(
    image_api: Arc<dyn ImageApi>,
    prompts: &Prompts,
    slides: &[Slide],
    dir: &Path,
    runner: &BatchRunner,
) -> Result<Vec<Option<RenderedImage>>, MediaError> {
    tokio::fs::create_dir_all(dir).await?;

    let mut jobs = Vec::with_capacity(slides.len());
    for (index, slide) in slides.iter().enumerate() {
        let prompt = prompts.image_prompt(&slide.title, &slide.bullet_points, &slide.visual)?;
        let path = dir.join(slide_filename(index, "png"));
        let api = Arc::clone(&image_api);

        jobs.push(move || async move {
            let bytes = api.generate_image(&prompt).await?;
            tokio::fs::write(&path, &bytes).await?;
            Ok::<_, crate::client::ClientError>(RenderedImage { index, path })
        });
    }

    let output = runner.run(jobs).await?;
    info!(
        requested = output.len(),
        rendered = output.succeeded(),
        "slide image rendering finished"
    );
    Ok(output.into_slots())
}
