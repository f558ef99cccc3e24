//! The LLM round trips that turn a topic into a filled slide deck.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{PlannedSlide, Slide, SlidePlan};
use crate::client::{ChatApi, ClientError};
use crate::extract::{self, ExtractError, MAX_OBJECTIVES};
use crate::prompt::{CONTENT_SYSTEM, OBJECTIVES_SYSTEM, PLANNING_SYSTEM, Prompts};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("content service failed: {0}")]
    Client(#[from] ClientError),

    #[error("could not parse model output: {0}")]
    Extract(#[from] ExtractError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("model returned an empty {0}")]
    Empty(&'static str),
}

/// Runs the three content phases against a content-generation service.
///
/// Each phase is a single request; the planner has no concurrency and no
/// retries. Malformed output is handled by the extraction layer, which is
/// why every phase also logs which parse path succeeded.
pub struct Planner<'a> {
    chat: &'a dyn ChatApi,
    prompts: &'a Prompts,
}

impl<'a> Planner<'a> {
    pub fn new(chat: &'a dyn ChatApi, prompts: &'a Prompts) -> Self {
        Self { chat, prompts }
    }

    /// Phase 1: topic to learning objectives.
    pub async fn objectives(&self, topic: &str) -> Result<Vec<String>, PlanError> {
        let user = self.prompts.objectives(topic, MAX_OBJECTIVES)?;
        let raw = self.chat.complete(OBJECTIVES_SYSTEM, &user).await?;

        let parsed = extract::parse_objectives(&raw)?;
        debug!(path = ?parsed.path, "parsed objectives");

        if parsed.value.is_empty() {
            return Err(PlanError::Empty("objective list"));
        }
        info!(count = parsed.value.len(), "generated learning objectives");
        Ok(parsed.value)
    }

    /// Phase 2: objectives to a deck outline.
    pub async fn plan(
        &self,
        topic: &str,
        objectives: &[String],
        max_slides: usize,
    ) -> Result<SlidePlan, PlanError> {
        let user = self.prompts.slide_plan(topic, objectives, max_slides)?;
        let raw = self.chat.complete(PLANNING_SYSTEM, &user).await?;

        let parsed = extract::parse_json::<SlidePlan>(&raw)?;
        debug!(path = ?parsed.path, "parsed slide plan");

        let mut plan = parsed.value;
        if plan.slides.is_empty() {
            return Err(PlanError::Empty("slide plan"));
        }
        if plan.slides.len() > max_slides {
            warn!(
                planned = plan.slides.len(),
                max_slides, "plan exceeded the slide cap, truncating"
            );
            plan.slides.truncate(max_slides);
        }
        info!(slides = plan.slides.len(), "planned slide deck");
        Ok(plan)
    }

    /// Phase 3: outline to written slides.
    pub async fn fill(&self, topic: &str, plan: &[PlannedSlide]) -> Result<Vec<Slide>, PlanError> {
        let user = self.prompts.slide_content(topic, plan)?;
        let raw = self.chat.complete(CONTENT_SYSTEM, &user).await?;

        let parsed = extract::parse_json::<Vec<Slide>>(&raw)?;
        debug!(path = ?parsed.path, "parsed slide content");

        let slides = parsed.value;
        if slides.is_empty() {
            return Err(PlanError::Empty("slide content"));
        }
        if slides.len() != plan.len() {
            warn!(
                planned = plan.len(),
                received = slides.len(),
                "slide content count differs from plan"
            );
        }
        info!(slides = slides.len(), "generated slide content");
        Ok(slides)
    }
}
