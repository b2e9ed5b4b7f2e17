use serde_json::Value;
use thiserror::Error;

pub const ACTION_MARKER: &str = "ACTION:";

/// Why a model response did not yield an action. Both cases are recoverable:
/// the loop reports them back to the model and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("No action found in response.")]
    NoAction,
    #[error("Invalid JSON in action string: {raw}")]
    InvalidJson { raw: String },
}

/// Extract the JSON action that follows the first `ACTION:` marker.
pub fn parse_action(response: &str) -> Result<Value, ParseFailure> {
    let Some(position) = response.find(ACTION_MARKER) else {
        return Err(ParseFailure::NoAction);
    };
    let raw = response[position + ACTION_MARKER.len()..].trim();
    let repaired = repair_json(raw);

    serde_json::from_str(&repaired).map_err(|_| ParseFailure::InvalidJson {
        raw: raw.to_string(),
    })
}

/// Best-effort normalization of almost-JSON produced by a model.
///
/// Strips markdown fences, drops prose before the first `{` and after the
/// outermost object closes, closes an unterminated string, removes trailing
/// commas and closes unbalanced braces and brackets. The output is not
/// guaranteed to parse.
pub fn repair_json(text: &str) -> String {
    let body = strip_code_fence(text);
    let Some(start) = body.find('{') else {
        return body.trim().to_string();
    };

    let mut out = String::with_capacity(body.len() + 8);
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in body[start..].chars() {
        if in_string {
            match ch {
                _ if escaped => {
                    escaped = false;
                    out.push(ch);
                }
                '\\' => {
                    escaped = true;
                    out.push(ch);
                }
                '"' => {
                    in_string = false;
                    out.push(ch);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(ch),
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '{' => {
                closers.push('}');
                out.push(ch);
            }
            '[' => {
                closers.push(']');
                out.push(ch);
            }
            '}' | ']' => {
                if !closers.contains(&ch) {
                    continue;
                }
                while let Some(expected) = closers.pop() {
                    drop_trailing_comma(&mut out);
                    out.push(expected);
                    if expected == ch {
                        break;
                    }
                }
                if closers.is_empty() {
                    return out;
                }
            }
            _ => out.push(ch),
        }
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    drop_trailing_comma(&mut out);
    if out.trim_end().ends_with(':') {
        out.push_str(" null");
    }
    while let Some(expected) = closers.pop() {
        drop_trailing_comma(&mut out);
        out.push(expected);
    }
    out
}

fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_fence = &text[open + 3..];
    // skip the language tag on the fence line
    let content = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };
    match content.find("```") {
        Some(close) => &content[..close],
        None => content,
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}
