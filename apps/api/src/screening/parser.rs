//! Response parser — turns the model's raw text into a sorted result set.

use std::cmp::Ordering;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::screening::models::{CandidateVerdict, SCHEMA_KEYS};

/// Raised when the model's text cannot become a table. `raw` is the
/// untouched model output, kept for display.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct ParseFailure {
    pub reason: String,
    pub raw: String,
}

impl ParseFailure {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

/// Removes every ```json / ``` marker and surrounding whitespace.
/// Applying it twice gives the same result as applying it once.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parses an array of verdict objects. Anything else is a `ParseFailure`,
/// as is an object carrying none of the schema keys.
pub fn parse_verdicts(raw: &str) -> Result<Vec<CandidateVerdict>, ParseFailure> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ParseFailure::new(format!("response is not valid JSON: {e}"), raw))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ParseFailure::new(
                format!("expected a JSON array, got {}", json_kind(&other)),
                raw,
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Some(object) = item.as_object() else {
                return Err(ParseFailure::new(
                    format!("element {index} is {}, not an object", json_kind(&item)),
                    raw,
                ));
            };
            if !SCHEMA_KEYS.iter().any(|key| object.contains_key(*key)) {
                let mut found: Vec<&str> = object.keys().map(String::as_str).collect();
                found.truncate(8);
                return Err(ParseFailure::new(
                    format!(
                        "element {index} has none of the expected keys (found: {})",
                        found.join(", ")
                    ),
                    raw,
                ));
            }
            serde_json::from_value::<CandidateVerdict>(item)
                .map_err(|e| ParseFailure::new(format!("element {index}: {e}"), raw))
        })
        .collect()
}

/// Stable sort, highest score first. Rows without a numeric score go last in
/// their original order.
pub fn sort_by_score(rows: &mut [CandidateVerdict]) {
    rows.sort_by(|a, b| match (a.score.numeric(), b.score.numeric()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Parse, sort, and flag verdicts that disagree with their score.
pub fn build_rows(raw: &str) -> Result<Vec<CandidateVerdict>, ParseFailure> {
    let mut rows = parse_verdicts(raw)?;
    sort_by_score(&mut rows);

    for row in rows.iter().filter(|r| !r.verdict_consistent()) {
        warn!(
            "Verdict '{}' for '{}' disagrees with score {}",
            row.verdict,
            row.name,
            row.score.display()
        );
    }

    Ok(rows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
