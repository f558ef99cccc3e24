//! Lecture data model.
//!
//! The content-generation phases hand these types from one to the next:
//! a topic becomes objectives, objectives become a [`SlidePlan`], and the
//! plan is filled into [`Slide`]s. The finished [`SlideDeck`] is persisted
//! as JSON so the media phases (and the user) can inspect what was
//! generated.

mod planner;

pub use planner::{PlanError, Planner};

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// One slide as planned, before its content is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedSlide {
    pub title: String,
    /// The learning objective this slide covers.
    pub objective: String,
}

/// The model's deck outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidePlan {
    pub slides: Vec<PlannedSlide>,
}

/// A fully written slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
    /// What the narrator says over this slide. May be empty, in which case
    /// there is nothing to synthesize.
    #[serde(default)]
    pub narration: String,
    /// One-or-two-sentence description of the slide illustration.
    #[serde(default)]
    pub visual: String,
}

/// Everything generated for one lecture, persisted between phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    pub topic: String,
    pub objectives: Vec<String>,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Writes the deck as pretty JSON, overwriting any previous run.
    pub async fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(io::Error::other)?;
        tokio::fs::write(path, json).await
    }
}
