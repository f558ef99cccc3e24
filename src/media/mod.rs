//! Media production: slide images, narration audio, video assembly.
//!
//! The two fan-out stages (images, narration) are the only concurrent parts
//! of the pipeline; both go through [`crate::batch::BatchRunner`] and come
//! back index-aligned with the slide deck. Assembly consumes the
//! intersection of the two.

pub mod assembly;
pub mod audio;
pub mod images;

pub use assembly::{AssemblyError, FfmpegAssembler, SlideClip, VideoAssembler};
pub use audio::{NarrationClip, synthesize_narration};
pub use images::{RenderedImage, render_images};

use thiserror::Error;

use crate::batch::BatchError;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("batch failed: {0}")]
    Batch(#[from] BatchError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Artifact name for slide `index`, one-based and zero-padded as in
/// `slide_01.png`.
pub(crate) fn slide_filename(index: usize, extension: &str) -> String {
    format!("slide_{:02}.{}", index + 1, extension)
}
