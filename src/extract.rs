//! Tolerant parsing of model output.
//!
//! Chat models asked for JSON reply with JSON most of the time, but also
//! with fenced JSON, JSON surrounded by prose, or (for list questions)
//! plain numbered lines. Every parser here attempts the strict path first
//! and falls back to a documented best-effort extractor, always returning
//! the same typed structure either way. The [`ParsePath`] that succeeded is
//! returned alongside the value so callers can log which route the response
//! took.

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Maximum number of learning objectives kept from a model response.
pub const MAX_OBJECTIVES: usize = 10;

/// Which parsing route produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePath {
    /// The response parsed as-is (after fence stripping).
    Strict,
    /// The degraded extractor had to dig the value out.
    Fallback,
}

/// A parsed value tagged with the route that produced it.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub value: T,
    pub path: ParsePath,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response contained no JSON value")]
    NoJsonFound,

    #[error("JSON did not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("response contained no usable lines")]
    NoUsableLines,
}

/// Parses a typed value out of a model response.
///
/// Strict path: strip a surrounding markdown code fence if present, then
/// deserialize the whole remainder. Fallback path: scan for the first
/// complete JSON object or array and deserialize that. If the scanner finds
/// JSON but it does not match `T`, the shape error is reported rather than
/// masked.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<Extracted<T>, ExtractError> {
    let unfenced = strip_code_fence(text);
    let candidate = unfenced.as_deref().unwrap_or(text).trim();

    if let Ok(value) = serde_json::from_str::<T>(candidate) {
        return Ok(Extracted {
            value,
            path: ParsePath::Strict,
        });
    }

    let snippet = first_json_entity(text).ok_or(ExtractError::NoJsonFound)?;
    let value = serde_json::from_str::<T>(snippet)?;
    Ok(Extracted {
        value,
        path: ParsePath::Fallback,
    })
}

/// Parses a learning-objective list out of a model response.
///
/// Strict path: a JSON array of strings. Fallback path: one objective per
/// line, with list markers and numbering stripped; lines too short to be an
/// objective are discarded. Either way the list is capped at
/// [`MAX_OBJECTIVES`] entries.
pub fn parse_objectives(text: &str) -> Result<Extracted<Vec<String>>, ExtractError> {
    if let Ok(parsed) = parse_json::<Vec<String>>(text) {
        let value: Vec<String> = parsed
            .value
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| o.len() > 3)
            .take(MAX_OBJECTIVES)
            .collect();
        if !value.is_empty() {
            return Ok(Extracted {
                value,
                path: parsed.path,
            });
        }
    }

    let value: Vec<String> = text
        .lines()
        .map(strip_list_marker)
        .filter(|line| line.len() > 3)
        .map(str::to_string)
        .take(MAX_OBJECTIVES)
        .collect();

    if value.is_empty() {
        return Err(ExtractError::NoUsableLines);
    }

    Ok(Extracted {
        value,
        path: ParsePath::Fallback,
    })
}

/// Returns the body of a markdown code fence, if the response carries one.
pub fn strip_code_fence(text: &str) -> Option<String> {
    let pattern = r"(?m)^\s*```[^\n]*\n((?:.*\n)*?)^\s*```\s*$";
    if let Ok(regex) = Regex::new(pattern)
        && let Some(captures) = regex.captures(text)
        && let Some(body) = captures.get(1)
    {
        return Some(body.as_str().trim_end().to_string());
    }
    None
}

/// Finds the first complete JSON object or array in free text.
///
/// Brace-counting scanner that is string- and escape-aware, so braces inside
/// string literals do not unbalance the count.
pub fn first_json_entity(text: &str) -> Option<&str> {
    let mut depth = 0i32;
    let mut start = None;
    let mut opening = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                    opening = Some(ch);
                }
                depth += 1;
            }
            '}' | ']' if !in_string => {
                depth -= 1;
                if depth == 0
                    && let Some(s) = start
                    && let Some(open) = opening
                {
                    let matched = (open == '{' && ch == '}') || (open == '[' && ch == ']');
                    if matched {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

fn strip_list_marker(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '*', '•', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', ')', ' ', '\t'])
        .trim()
}
