//! Pipeline tests against mock collaborator services.

use ampora::batch::BatchError;
use ampora::client::{ChatApi, ClientError, ImageApi, SpeechApi};
use ampora::media::{AssemblyError, MediaError, SlideClip, VideoAssembler};
use ampora::pipeline::{Pipeline, PipelineError};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const OBJECTIVES_TEXT: &str = "1. Understand what the algorithm does\n\
                               2. Trace one pass by hand\n\
                               3. Analyze the running cost\n";

const PLAN_JSON: &str = r#"{"slides": [
    {"title": "What It Does", "objective": "Understand what the algorithm does"},
    {"title": "One Pass", "objective": "Trace one pass by hand"},
    {"title": "Cost", "objective": "Analyze the running cost"}
]}"#;

/// Image and speech mocks key off markers planted in slide content:
/// a title containing `broken diagram` fails image rendering, and a
/// narration containing `unspeakable` fails synthesis.
fn content_json(titles: [&str; 3], narrations: [&str; 3]) -> String {
    let slides: Vec<String> = titles
        .iter()
        .zip(narrations.iter())
        .map(|(title, narration)| {
            format!(
                r#"{{"title": "{title}", "bullet_points": ["a point"], "narration": "{narration}", "visual": "a diagram"}}"#
            )
        })
        .collect();
    format!("[{}]", slides.join(","))
}

struct ScriptedChat {
    responses: Mutex<Vec<String>>,
}

impl ScriptedChat {
    fn new(responses: Vec<String>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl ChatApi for ScriptedChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ClientError> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ClientError::Protocol("no scripted response left".to_string()))
    }
}

struct MarkerImage;

#[async_trait]
impl ImageApi for MarkerImage {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ClientError> {
        if prompt.contains("broken diagram") {
            return Err(ClientError::Api {
                status: 500,
                message: "image backend unavailable".to_string(),
            });
        }
        Ok(b"png-bytes".to_vec())
    }
}

struct MarkerSpeech;

#[async_trait]
impl SpeechApi for MarkerSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ClientError> {
        if text.contains("unspeakable") {
            return Err(ClientError::Api {
                status: 500,
                message: "speech backend unavailable".to_string(),
            });
        }
        Ok(b"mp3-bytes".to_vec())
    }
}

/// Records what it was asked to assemble and touches the output path.
struct RecordingAssembler {
    seen: Mutex<Vec<usize>>,
}

impl RecordingAssembler {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VideoAssembler for RecordingAssembler {
    async fn assemble(&self, clips: &[SlideClip], output: &Path) -> Result<PathBuf, AssemblyError> {
        *self.seen.lock().unwrap() = clips.iter().map(|c| c.index).collect();
        tokio::fs::write(output, format!("{} clips", clips.len())).await?;
        Ok(output.to_path_buf())
    }
}

fn pipeline_with(
    chat: ScriptedChat,
    assembler: Arc<RecordingAssembler>,
) -> Pipeline {
    Pipeline::new(
        Arc::new(chat),
        Arc::new(MarkerImage),
        Arc::new(MarkerSpeech),
        assembler,
        2,
    )
    .unwrap()
}

#[tokio::test]
async fn happy_path_renders_every_slide() {
    let chat = ScriptedChat::new(vec![
        OBJECTIVES_TEXT.to_string(),
        PLAN_JSON.to_string(),
        content_json(
            ["What It Does", "One Pass", "Cost"],
            [
                "First we look at the idea.",
                "Now we trace a pass.",
                "Finally the cost.",
            ],
        ),
    ]);

    let assembler = Arc::new(RecordingAssembler::new());
    let pipeline = pipeline_with(chat, Arc::clone(&assembler));

    let dir = tempfile::tempdir().unwrap();
    let workdir = dir.path().join("work");
    let output = dir.path().join("lecture.mp4");

    let report = pipeline
        .generate("Bubble Sort", &workdir, &output)
        .await
        .unwrap();

    assert_eq!(report.slides_total, 3);
    assert_eq!(report.slides_rendered, 3);
    assert_eq!(report.video, output);
    assert_eq!(*assembler.seen.lock().unwrap(), vec![0, 1, 2]);

    // Artifacts land where the next phase expects them.
    assert!(workdir.join("lecture.json").exists());
    assert!(workdir.join("images/slide_01.png").exists());
    assert!(workdir.join("images/slide_03.png").exists());
    assert!(workdir.join("audio/slide_02.mp3").exists());
    assert!(output.exists());
}

#[tokio::test]
async fn failed_sides_drop_their_slides_but_not_the_run() {
    // Slide 2's image fails, slide 3 has nothing to narrate; only slide 1
    // has both halves and makes it into the video.
    let chat = ScriptedChat::new(vec![
        OBJECTIVES_TEXT.to_string(),
        PLAN_JSON.to_string(),
        content_json(
            ["What It Does", "A broken diagram", "Cost"],
            ["First we look at the idea.", "Now we trace a pass.", ""],
        ),
    ]);

    let assembler = Arc::new(RecordingAssembler::new());
    let pipeline = pipeline_with(chat, Arc::clone(&assembler));

    let dir = tempfile::tempdir().unwrap();
    let workdir = dir.path().join("work");
    let output = dir.path().join("lecture.mp4");

    let report = pipeline
        .generate("Bubble Sort", &workdir, &output)
        .await
        .unwrap();

    assert_eq!(report.slides_total, 3);
    assert_eq!(report.slides_rendered, 1);
    assert_eq!(*assembler.seen.lock().unwrap(), vec![0]);

    assert!(workdir.join("images/slide_01.png").exists());
    assert!(!workdir.join("images/slide_02.png").exists());
    assert!(workdir.join("audio/slide_02.mp3").exists());
    assert!(!workdir.join("audio/slide_03.mp3").exists());
}

#[tokio::test]
async fn disjoint_survivors_mean_nothing_to_render() {
    // Slide 1 loses its image, slide 2 loses its narration: neither batch
    // fails outright, but no slide has both halves.
    let chat = ScriptedChat::new(vec![
        OBJECTIVES_TEXT.to_string(),
        r#"{"slides": [
            {"title": "A broken diagram", "objective": "a"},
            {"title": "Cost", "objective": "b"}
        ]}"#
        .to_string(),
        r#"[
            {"title": "A broken diagram", "bullet_points": [], "narration": "Fine narration.", "visual": "x"},
            {"title": "Cost", "bullet_points": [], "narration": "An unspeakable narration.", "visual": "y"}
        ]"#
        .to_string(),
    ]);

    let assembler = Arc::new(RecordingAssembler::new());
    let pipeline = pipeline_with(chat, Arc::clone(&assembler));

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline
        .generate(
            "Bubble Sort",
            &dir.path().join("work"),
            &dir.path().join("lecture.mp4"),
        )
        .await;

    assert!(matches!(result, Err(PipelineError::NoRenderableSlides)));
}

#[tokio::test]
async fn total_image_failure_fails_the_image_phase() {
    let chat = ScriptedChat::new(vec![
        OBJECTIVES_TEXT.to_string(),
        PLAN_JSON.to_string(),
        content_json(
            ["A broken diagram", "Another broken diagram", "Still a broken diagram"],
            ["One.", "Two.", "Three."],
        ),
    ]);

    let assembler = Arc::new(RecordingAssembler::new());
    let pipeline = pipeline_with(chat, Arc::clone(&assembler));

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline
        .generate(
            "Bubble Sort",
            &dir.path().join("work"),
            &dir.path().join("lecture.mp4"),
        )
        .await;

    match result {
        Err(PipelineError::Images(MediaError::Batch(BatchError::TotalFailure { attempted }))) => {
            assert_eq!(attempted, 3);
        }
        other => panic!("expected total image failure, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_failure_surfaces_as_the_objectives_phase() {
    let chat = ScriptedChat::new(vec![]);
    let assembler = Arc::new(RecordingAssembler::new());
    let pipeline = pipeline_with(chat, assembler);

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline
        .generate(
            "Bubble Sort",
            &dir.path().join("work"),
            &dir.path().join("lecture.mp4"),
        )
        .await;

    assert!(matches!(result, Err(PipelineError::Objectives(_))));
}
