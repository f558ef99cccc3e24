//! End-to-end lecture generation.
//!
//! The pipeline is a linear phase sequence: objectives, slide plan, slide
//! content, then the two media fan-outs, the pairing step, and assembly.
//! Only the media fan-outs are concurrent; everything else is one request
//! after another.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::batch::{BatchRunner, pair_surviving};
use crate::client::{ChatApi, ImageApi, SpeechApi};
use crate::lecture::{PlanError, Planner, SlideDeck};
use crate::media::{
    AssemblyError, MediaError, SlideClip, VideoAssembler, render_images, synthesize_narration,
};
use crate::prompt::Prompts;

pub const DEFAULT_MAX_SLIDES: usize = 10;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("objective generation failed: {0}")]
    Objectives(#[source] PlanError),

    #[error("slide planning failed: {0}")]
    Plan(#[source] PlanError),

    #[error("slide content generation failed: {0}")]
    Content(#[source] PlanError),

    #[error("image rendering failed: {0}")]
    Images(#[source] MediaError),

    #[error("narration synthesis failed: {0}")]
    Narration(#[source] MediaError),

    /// No slide survived both media stages, so there is nothing to render.
    #[error("no slide has both an image and narration")]
    NoRenderableSlides,

    #[error("video assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a finished run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub video: PathBuf,
    pub deck_path: PathBuf,
    /// Slides in the generated deck.
    pub slides_total: usize,
    /// Slides that made it into the video.
    pub slides_rendered: usize,
}

/// The lecture generator, wired to its four collaborator services.
pub struct Pipeline {
    chat: Arc<dyn ChatApi>,
    image: Arc<dyn ImageApi>,
    speech: Arc<dyn SpeechApi>,
    assembler: Arc<dyn VideoAssembler>,
    prompts: Prompts,
    runner: BatchRunner,
    max_slides: usize,
}

impl Pipeline {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        image: Arc<dyn ImageApi>,
        speech: Arc<dyn SpeechApi>,
        assembler: Arc<dyn VideoAssembler>,
        max_workers: usize,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            chat,
            image,
            speech,
            assembler,
            prompts: Prompts::new()?,
            runner: BatchRunner::new(max_workers),
            max_slides: DEFAULT_MAX_SLIDES,
        })
    }

    pub fn with_max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = max_slides.max(1);
        self
    }

    /// Runs the whole pipeline for one topic.
    ///
    /// Intermediate artifacts (deck JSON, images, audio) land under
    /// `workdir`; the finished video is written to `output`. Re-running
    /// with the same directories overwrites previous artifacts.
    pub async fn generate(
        &self,
        topic: &str,
        workdir: &Path,
        output: &Path,
    ) -> Result<PipelineReport, PipelineError> {
        info!(topic, "starting lecture generation");
        tokio::fs::create_dir_all(workdir).await?;

        let planner = Planner::new(&*self.chat, &self.prompts);

        let objectives = planner
            .objectives(topic)
            .await
            .map_err(PipelineError::Objectives)?;

        let plan = planner
            .plan(topic, &objectives, self.max_slides)
            .await
            .map_err(PipelineError::Plan)?;

        let slides = planner
            .fill(topic, &plan.slides)
            .await
            .map_err(PipelineError::Content)?;

        let deck = SlideDeck {
            topic: topic.to_string(),
            objectives,
            slides,
        };
        let deck_path = workdir.join("lecture.json");
        deck.save(&deck_path).await?;
        info!(path = %deck_path.display(), "slide deck saved");

        let images = render_images(
            Arc::clone(&self.image),
            &self.prompts,
            &deck.slides,
            &workdir.join("images"),
            &self.runner,
        )
        .await
        .map_err(PipelineError::Images)?;

        let narration = synthesize_narration(
            Arc::clone(&self.speech),
            &deck.slides,
            &workdir.join("audio"),
            &self.runner,
        )
        .await
        .map_err(PipelineError::Narration)?;

        let slides_total = deck.slides.len();
        let pairs = pair_surviving(images, narration);
        if pairs.is_empty() {
            return Err(PipelineError::NoRenderableSlides);
        }
        if pairs.len() < slides_total {
            warn!(
                dropped = slides_total - pairs.len(),
                "some slides will not appear in the video"
            );
        }

        let clips: Vec<SlideClip> = pairs
            .into_iter()
            .map(|(index, image, clip)| SlideClip {
                index,
                image: image.path,
                audio: clip.path,
            })
            .collect();

        let video = self.assembler.assemble(&clips, output).await?;

        info!(
            video = %video.display(),
            rendered = clips.len(),
            total = slides_total,
            "lecture generation finished"
        );

        Ok(PipelineReport {
            video,
            deck_path,
            slides_total,
            slides_rendered: clips.len(),
        })
    }
}
