//! Canonical text form of documents
//!
//! The rendering is deterministic: mapping keys are sorted, and a container
//! stays on one line while it fits in [`WIDTH`] columns, otherwise it is
//! broken one entry per line with two-space indentation. Both sides of a
//! comparison go through the same renderer, so the character diff only shows
//! real differences.

use super::loader::{Loaded, Value};

/// Target line width.
pub const WIDTH: usize = 80;

const INDENT: usize = 2;

/// Render a value in canonical pretty form.
pub fn render_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, 0);
    out
}

/// Render a loaded document; undecodable documents show their reason.
pub fn render_loaded(loaded: &Loaded) -> String {
    match loaded {
        Loaded::Decoded(value) => render_value(value),
        Loaded::Undecodable(reason) => format!("<undecodable: {reason}>"),
    }
}

/// Render a value on a single line.
pub fn render_flat(value: &Value) -> String {
    let mut out = String::new();
    write_flat(&mut out, value);
    out
}

fn write_flat(out: &mut String, value: &Value) {
    match value {
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flat(out, item);
            }
            out.push(']');
        }
        Value::Mapping(_) => {
            out.push('{');
            for (i, (key, item)) in sorted_entries(value).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key);
                out.push_str(": ");
                write_flat(out, item);
            }
            out.push('}');
        }
        Value::Tagged(tagged) => {
            out.push_str(&tagged.tag.to_string());
            out.push(' ');
            write_flat(out, &tagged.value);
        }
        scalar => out.push_str(&render_scalar(scalar)),
    }
}

/// `column` is where the value starts on the current line.
fn write_value(out: &mut String, value: &Value, indent: usize, column: usize) {
    let flat = render_flat(value);
    let breakable = matches!(value, Value::Sequence(s) if !s.is_empty())
        || matches!(value, Value::Mapping(m) if !m.is_empty());
    if !breakable || column + flat.chars().count() <= WIDTH {
        out.push_str(&flat);
        return;
    }

    let inner = indent + INDENT;
    match value {
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                out.push('\n');
                push_indent(out, inner);
                write_value(out, item, inner, inner);
                if i + 1 < items.len() {
                    out.push(',');
                }
            }
            out.push('\n');
            push_indent(out, indent);
            out.push(']');
        }
        Value::Mapping(_) => {
            let entries = sorted_entries(value);
            let count = entries.len();
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                out.push('\n');
                push_indent(out, inner);
                out.push_str(&key);
                out.push_str(": ");
                write_value(out, item, inner, inner + key.chars().count() + 2);
                if i + 1 < count {
                    out.push(',');
                }
            }
            out.push('\n');
            push_indent(out, indent);
            out.push('}');
        }
        _ => out.push_str(&flat),
    }
}

fn sorted_entries(value: &Value) -> Vec<(String, &Value)> {
    let Value::Mapping(mapping) = value else {
        return Vec::new();
    };
    let mut entries: Vec<(String, &Value)> = mapping
        .iter()
        .map(|(k, v)| (render_flat(k), v))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}")),
        other => render_flat(other),
    }
}

fn push_indent(out: &mut String, width: usize) {
    out.extend(std::iter::repeat_n(' ', width));
}
