//! Prompt rendering for the content-generation phases.
//!
//! Templates live here as minijinja sources and are compiled once into a
//! [`Prompts`] environment. Callers get plain strings back; nothing else in
//! the crate knows what the prompts say.

use minijinja::{Environment, context};

use crate::lecture::PlannedSlide;

pub const OBJECTIVES_SYSTEM: &str = "You are an expert curriculum designer. You break topics down \
     into specific, logically ordered learning objectives for university-level lectures.";

pub const PLANNING_SYSTEM: &str = "You are an experienced lecturer planning a slide deck. You reply \
     with JSON only, no prose and no code fences.";

pub const CONTENT_SYSTEM: &str = "You are a friendly educator writing for a voice-over narrator. \
     Narration must sound natural when read aloud: full sentences, smooth transitions, no formulas, \
     no markdown. You reply with JSON only.";

const OBJECTIVES_TEMPLATE: &str = "\
Topic: {{ topic }}

Write a numbered list of at most {{ max_objectives }} learning objectives for a lecture on this topic. \
Each objective must name one concrete sub-skill or question the learner should master, not a vague theme.";

const SLIDE_PLAN_TEMPLATE: &str = "\
Plan a slide deck for a lecture on \"{{ topic }}\".

Learning objectives:
{% for objective in objectives %}- {{ objective }}
{% endfor %}
Reply with a JSON object of the form
{\"slides\": [{\"title\": \"...\", \"objective\": \"...\"}]}
using at most {{ max_slides }} slides. Every listed objective must be covered by some slide.";

const SLIDE_CONTENT_TEMPLATE: &str = "\
Write the full content for each planned slide of a lecture on \"{{ topic }}\".

Planned slides:
{% for slide in slides %}{{ loop.index }}. {{ slide.title }} ({{ slide.objective }})
{% endfor %}
Reply with a JSON array holding one object per slide, in the same order:
[{\"title\": \"...\", \"bullet_points\": [\"...\"], \"narration\": \"...\", \"visual\": \"...\"}]
The narration is what the narrator says over the slide; keep it conversational and free of symbols. \
The visual field describes, in one or two sentences, a single diagram or illustration for the slide.";

const IMAGE_PROMPT_TEMPLATE: &str = "\
A clean 16:9 lecture slide illustration, flat design, no watermarks.
Slide title: {{ title }}
{% if bullet_points %}Key points: {{ bullet_points | join(\"; \") }}
{% endif %}Depict: {{ visual }}";

/// Compiled prompt templates for the pipeline.
pub struct Prompts {
    env: Environment<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("objectives", OBJECTIVES_TEMPLATE)?;
        env.add_template("slide_plan", SLIDE_PLAN_TEMPLATE)?;
        env.add_template("slide_content", SLIDE_CONTENT_TEMPLATE)?;
        env.add_template("image_prompt", IMAGE_PROMPT_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn objectives(&self, topic: &str, max_objectives: usize) -> Result<String, minijinja::Error> {
        self.env
            .get_template("objectives")?
            .render(context! { topic, max_objectives })
    }

    pub fn slide_plan(
        &self,
        topic: &str,
        objectives: &[String],
        max_slides: usize,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template("slide_plan")?
            .render(context! { topic, objectives, max_slides })
    }

    pub fn slide_content(
        &self,
        topic: &str,
        slides: &[PlannedSlide],
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template("slide_content")?
            .render(context! { topic, slides })
    }

    pub fn image_prompt(
        &self,
        title: &str,
        bullet_points: &[String],
        visual: &str,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template("image_prompt")?
            .render(context! { title, bullet_points, visual })
    }
}
