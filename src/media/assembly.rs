//! Video assembly via ffmpeg.
//!
//! Each surviving (image, audio) pair is rendered into a still-image
//! segment, then the segments are copy-muxed into the final MP4 through
//! ffmpeg's concat demuxer, which joins them without re-encoding.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use super::slide_filename;

/// Frame rate for the still-image segments.
const DEFAULT_FPS: u32 = 24;
/// Breathing room appended after each slide's narration.
const DEFAULT_TAIL_PAUSE_SECS: f64 = 0.25;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no clips to assemble")]
    NoClips,

    #[error("ffmpeg {stage} step exited with code {code}")]
    Ffmpeg { stage: &'static str, code: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One renderable slide: an image and its narration, already paired by
/// index intersection.
#[derive(Debug, Clone)]
pub struct SlideClip {
    pub index: usize,
    pub image: PathBuf,
    pub audio: PathBuf,
}

/// The media-assembly collaborator.
///
/// Inputs must be index-aligned pairs; producing them is the caller's job.
#[async_trait]
pub trait VideoAssembler: Send + Sync {
    async fn assemble(&self, clips: &[SlideClip], output: &Path) -> Result<PathBuf, AssemblyError>;
}

/// Assembles the lecture video by shelling out to ffmpeg.
pub struct FfmpegAssembler {
    work_dir: PathBuf,
    fps: u32,
    tail_pause_secs: f64,
}

impl FfmpegAssembler {
    /// `work_dir` receives the intermediate per-slide segments.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            fps: DEFAULT_FPS,
            tail_pause_secs: DEFAULT_TAIL_PAUSE_SECS,
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Renders one still-image segment: the image held for the length of
    /// the narration plus a short tail pause.
    async fn render_segment(&self, clip: &SlideClip) -> Result<PathBuf, AssemblyError> {
        let segment = self.work_dir.join(slide_filename(clip.index, "mp4"));

        let status = Command::new("ffmpeg")
            .arg("-y")
            .args(["-loop", "1"])
            .arg("-i")
            .arg(&clip.image)
            .arg("-i")
            .arg(&clip.audio)
            .args(["-af", &format!("apad=pad_dur={}", self.tail_pause_secs)])
            .arg("-shortest")
            .args(["-r", &self.fps.to_string()])
            .args(["-c:v", "libx264", "-tune", "stillimage", "-pix_fmt", "yuv420p"])
            .args(["-c:a", "aac"])
            .arg(&segment)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(AssemblyError::Ffmpeg {
                stage: "segment",
                code: status.code().unwrap_or(-1),
            });
        }

        debug!(index = clip.index, segment = %segment.display(), "segment rendered");
        Ok(segment)
    }
}

/// Builds the contents of an ffmpeg concat manifest: one
/// `file '<path>'` line per segment, in order.
fn concat_manifest(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| format!("file '{}'", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl VideoAssembler for FfmpegAssembler {
    async fn assemble(&self, clips: &[SlideClip], output: &Path) -> Result<PathBuf, AssemblyError> {
        if clips.is_empty() {
            return Err(AssemblyError::NoClips);
        }

        tokio::fs::create_dir_all(&self.work_dir).await?;

        let mut segments = Vec::with_capacity(clips.len());
        for clip in clips {
            segments.push(self.render_segment(clip).await?);
        }

        let manifest_path = self.work_dir.join("concat_manifest.txt");
        tokio::fs::write(&manifest_path, concat_manifest(&segments)).await?;

        let status = Command::new("ffmpeg")
            .arg("-y")
            .args(["-f", "concat", "-safe", "0"])
            .arg("-i")
            .arg(&manifest_path)
            .args(["-c", "copy"])
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        let _ = tokio::fs::remove_file(&manifest_path).await;

        if !status.success() {
            return Err(AssemblyError::Ffmpeg {
                stage: "concat",
                code: status.code().unwrap_or(-1),
            });
        }

        info!(clips = clips.len(), output = %output.display(), "video assembled");
        Ok(output.to_path_buf())
    }
}
