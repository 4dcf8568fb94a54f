//! Tolerant readers for free-text model replies
//!
//! None of these functions fail. Malformed replies map to documented
//! fallback values so the pipeline always moves on to the next phase.

use crate::types::{IntentUnderstanding, ReasoningStep};
use tracing::debug;

/// Labels the intent-understanding prompt asks the model to cover
pub const UNDERSTANDING_LABELS: [&str; 5] =
    ["PRIMARY goal", "CONSTRAINTS", "PATTERNS", "RISKS", "DEPENDENCIES"];

/// Confidence of the single step synthesised from an unstructured plan
pub const UNSTRUCTURED_STEP_CONFIDENCE: f64 = 0.5;

const FENCE: &str = "```";
const BULLETS: [char; 3] = ['-', '•', '*'];

fn contains_label(line: &str, label: &str) -> bool {
    line.to_uppercase().contains(&label.to_uppercase())
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().map_or(false, |c| c.is_ascii_digit())
}

/// Text of the section introduced by `label`.
///
/// Capture starts on the first line mentioning the label (any text after a
/// `:` on that line is kept). Bulleted lines are collected; numbered lines
/// are skipped, unless they introduce another known label, which ends the
/// section; any other non-blank line ends it. Nothing collected yields
/// `"Not found"`.
pub fn extract_section(response: &str, label: &str) -> String {
    let mut collected: Vec<String> = Vec::new();
    let mut capturing = false;

    for line in response.lines() {
        let trimmed = line.trim();

        if !capturing {
            if contains_label(line, label) {
                capturing = true;
                if let Some((_, inline)) = line.split_once(':') {
                    let inline = inline.trim().trim_matches('*').trim();
                    if !inline.is_empty() {
                        collected.push(inline.to_string());
                    }
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(&BULLETS[..]) {
            collected.push(trimmed.to_string());
        } else if starts_with_digit(line) {
            let starts_other_section = UNDERSTANDING_LABELS
                .iter()
                .any(|other| !other.eq_ignore_ascii_case(label) && contains_label(line, other));
            if starts_other_section {
                break;
            }
        } else {
            break;
        }
    }

    if collected.is_empty() {
        IntentUnderstanding::NOT_FOUND.to_string()
    } else {
        collected.join("\n")
    }
}

pub fn parse_understanding(response: &str) -> IntentUnderstanding {
    let [goal, constraints, patterns, risks, dependencies] =
        UNDERSTANDING_LABELS.map(|label| extract_section(response, label));
    IntentUnderstanding {
        raw: response.to_string(),
        primary_goal: goal,
        constraints,
        patterns,
        risks,
        dependencies,
    }
}

/// Thought text after the first `.` or `:` of a step line
fn step_thought(line: &str) -> String {
    match line.find(|c| c == '.' || c == ':') {
        Some(separator) => line[separator + 1..].trim().to_string(),
        None => line.trim().to_string(),
    }
}

/// Leading digit run of a step line, so "12. Refactor" is step 12.
///
/// The whole run is read instead of only the first digit, which would
/// number that line 1; lines without a leading digit get 0.
fn step_number(line: &str) -> u32 {
    let digits: String = line.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn labelled<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label).map(str::trim)
}

/// Parse a numbered plan into ordered steps.
///
/// A line beginning with a digit starts a step. `Action:`, `Rationale:` and
/// `Confidence:` lines fill in the current step, and a fenced block inside a
/// step becomes its code snippet; numbered lines inside a fence never start
/// steps. A reply without any numbered line becomes one step holding the
/// whole reply, weighted [`UNSTRUCTURED_STEP_CONFIDENCE`].
pub fn parse_reasoning_steps(response: &str) -> Vec<ReasoningStep> {
    let mut steps: Vec<ReasoningStep> = Vec::new();
    let mut current: Option<ReasoningStep> = None;
    let mut in_fence = false;
    let mut snippet: Vec<&str> = Vec::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with(FENCE) {
            if in_fence {
                if let Some(step) = current.as_mut() {
                    if step.code_snippet.is_none() && !snippet.is_empty() {
                        step.code_snippet = Some(snippet.join("\n"));
                    }
                }
                snippet.clear();
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            snippet.push(line);
            continue;
        }

        if starts_with_digit(line) {
            if let Some(step) = current.take() {
                steps.push(step);
            }
            current = Some(ReasoningStep::new(step_number(line), step_thought(line)));
            continue;
        }

        let Some(step) = current.as_mut() else {
            continue;
        };
        if let Some(action) = labelled(trimmed, "Action:") {
            step.action = action.to_string();
        } else if let Some(rationale) = labelled(trimmed, "Rationale:") {
            step.rationale = Some(rationale.to_string());
        } else if let Some(confidence) = labelled(trimmed, "Confidence:") {
            match parse_confidence(confidence) {
                Some(value) => step.confidence = value,
                None => debug!("Ignoring unreadable step confidence '{}'", confidence),
            }
        }
    }

    if let Some(step) = current {
        steps.push(step);
    }

    if steps.is_empty() {
        debug!("Reasoning reply had no numbered steps, using it as a single step");
        let thought = response.trim();
        let mut step = ReasoningStep::new(
            1,
            if thought.is_empty() {
                "No explicit reasoning provided"
            } else {
                thought
            },
        );
        step.confidence = UNSTRUCTURED_STEP_CONFIDENCE;
        steps.push(step);
    }

    steps
}

/// `0.8` or `80%`
fn parse_confidence(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => text.parse::<f64>().ok(),
    }
}

/// Lines between the first pair of fence lines.
///
/// Any line containing the fence delimiter toggles between outside and
/// inside. `None` when no block is closed or the block is empty, so the
/// caller can fall back to the original source.
pub fn extract_code_block(response: &str) -> Option<String> {
    let mut inside = false;
    let mut lines: Vec<&str> = Vec::new();

    for line in response.lines() {
        if line.contains(FENCE) {
            if inside {
                return if lines.is_empty() {
                    None
                } else {
                    Some(lines.join("\n"))
                };
            }
            inside = true;
            continue;
        }
        if inside {
            lines.push(line);
        }
    }

    None
}
