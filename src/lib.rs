//! `ampora` - an AI lecture video generator.
//!
//! Given a topic string, the pipeline asks a chat model for learning
//! objectives and a slide-by-slide script, renders one visual per slide
//! through an image model, synthesizes narration through a speech model,
//! and stitches the surviving (image, audio) pairs into an MP4 with ffmpeg.
//!
//! The collaborator services (content generation, image generation, speech
//! synthesis, media assembly) are opaque boundaries behind trait seams; the
//! crate's own engineering lives in [`batch`], the ordered parallel runner
//! both media fan-outs share.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ampora::client::{GeminiClient, OpenAiClient};
//! use ampora::config::Config;
//! use ampora::media::FfmpegAssembler;
//! use ampora::pipeline::Pipeline;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let openai = Arc::new(OpenAiClient::new(&config));
//! let gemini = Arc::new(GeminiClient::new(&config));
//! let assembler = Arc::new(FfmpegAssembler::new("work/segments"));
//!
//! let pipeline = Pipeline::new(
//!     openai.clone(),
//!     gemini,
//!     openai,
//!     assembler,
//!     config.max_workers,
//! )?;
//!
//! let report = pipeline
//!     .generate("Stochastic Gradient Descent", Path::new("work"), Path::new("lecture.mp4"))
//!     .await?;
//! println!("{} slides rendered into {}", report.slides_rendered, report.video.display());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod extract;
pub mod lecture;
pub mod media;
pub mod pipeline;
pub mod prompt;

pub use batch::{BatchOutput, BatchRunner, FailurePolicy, pair_surviving};
pub use config::Config;
pub use pipeline::{Pipeline, PipelineError, PipelineReport};
