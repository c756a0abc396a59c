//! Pulling the JSON payload out of model text.
//!
//! Even with a JSON response type, models sometimes wrap the payload in a
//! markdown fence or add a sentence before it. Extraction tries, in order:
//! 1. a fenced block (```` ```json ```` or a bare fence)
//! 2. the first balanced `{ ... }` object
//! 3. the first balanced `[ ... ]` array

use hikayat_error::{HikayatResult, StoryError, StoryErrorKind};
use tracing::warn;

/// Extract a JSON document from model output.
///
/// # Errors
///
/// Returns [`StoryErrorKind::MalformedAnalysis`] if no JSON-looking content is found.
///
/// # Examples
///
/// ```
/// use hikayat_models::extract_json;
///
/// let response = "Here are the scenes:\n```json\n{\"scenes\": []}\n```";
/// assert_eq!(extract_json(response).unwrap(), "{\"scenes\": []}");
///
/// let bare = "{\"scenes\": [{\"characters\": \"Karim {7}\"}]} trailing";
/// assert!(extract_json(bare).unwrap().ends_with("}]}"));
/// ```
pub fn extract_json(response: &str) -> HikayatResult<String> {
    let trimmed = response.trim();
    if trimmed.starts_with('{') && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    if let Some(json) = fenced_block(response) {
        return Ok(json);
    }

    let object = response.find('{');
    let array = response.find('[');
    let found = match (object, array) {
        (Some(o), Some(a)) if a < o => {
            balanced(response, '[', ']').or_else(|| balanced(response, '{', '}'))
        }
        _ => balanced(response, '{', '}').or_else(|| balanced(response, '[', ']')),
    };

    found.ok_or_else(|| {
        warn!(response_length = response.len(), "No JSON found in model response");
        StoryError::new(StoryErrorKind::MalformedAnalysis(format!(
            "no JSON found in response ({} bytes)",
            response.len()
        )))
        .into()
    })
}

/// Content of the first markdown fence, preferring a `json` fence.
///
/// An unterminated fence yields everything after it (truncated output).
fn fenced_block(response: &str) -> Option<String> {
    let body_start = match response.find("```json") {
        Some(start) => start + "```json".len(),
        None => {
            // Skip a language tag on the opening fence line.
            let start = response.find("```")? + 3;
            start + response[start..].find('\n').map_or(0, |n| n + 1)
        }
    };

    let body = &response[body_start..];
    let content = body.find("```").map_or(body, |end| &body[..end]);
    Some(content.trim().to_string())
}

/// First `open ... close` span with matching depth, ignoring delimiters inside strings.
fn balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in response[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(response[start..end].to_string());
                }
            }
            _ => {}
        }
    }

    None
}
