use ampora::client::{GeminiClient, OpenAiClient};
use ampora::config::Config;
use ampora::lecture::Planner;
use ampora::media::FfmpegAssembler;
use ampora::pipeline::{DEFAULT_MAX_SLIDES, Pipeline};
use ampora::prompt::Prompts;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ampora")]
#[command(about = "Generate a narrated lecture video from a topic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full lecture video
    Generate {
        /// Topic to teach
        #[arg(short, long)]
        topic: String,

        /// Path of the finished MP4
        #[arg(short, long, default_value = "lecture.mp4")]
        output: PathBuf,

        /// Directory for intermediate artifacts (deck JSON, images, audio)
        #[arg(short, long, default_value = "ampora-work")]
        workdir: PathBuf,

        /// Concurrent API calls per media stage (defaults to AMPORA_MAX_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// Upper bound on deck size
        #[arg(long, default_value_t = DEFAULT_MAX_SLIDES)]
        max_slides: usize,
    },

    /// Print the learning objectives for a topic and stop
    Objectives {
        /// Topic to teach
        #[arg(short, long)]
        topic: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("incomplete configuration")?;

    match cli.command {
        Commands::Generate {
            topic,
            output,
            workdir,
            workers,
            max_slides,
        } => {
            let openai = Arc::new(OpenAiClient::new(&config));
            let gemini = Arc::new(GeminiClient::new(&config));
            let assembler = Arc::new(FfmpegAssembler::new(workdir.join("segments")));

            let pipeline = Pipeline::new(
                openai.clone(),
                gemini,
                openai,
                assembler,
                workers.unwrap_or(config.max_workers),
            )
            .context("failed to compile prompt templates")?
            .with_max_slides(max_slides);

            let report = pipeline.generate(&topic, &workdir, &output).await?;

            println!(
                "Done: {} ({} of {} slides rendered, deck at {})",
                report.video.display(),
                report.slides_rendered,
                report.slides_total,
                report.deck_path.display(),
            );
        }

        Commands::Objectives { topic } => {
            let openai = OpenAiClient::new(&config);
            let prompts = Prompts::new().context("failed to compile prompt templates")?;
            let planner = Planner::new(&openai, &prompts);

            let objectives = planner.objectives(&topic).await?;
            for (i, objective) in objectives.iter().enumerate() {
                println!("{}. {}", i + 1, objective);
            }
        }
    }

    Ok(())
}
