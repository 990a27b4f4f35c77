//! Colorized JSON pretty-printing for terminal output.
//!
//! Renders JSON values with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Print a JSON value with colorized syntax highlighting.
///
/// Renders the value with 2-space indentation and ANSI color codes.
/// When `use_color` is false, outputs plain JSON without colors
/// (suitable for machine consumption or piping).
pub fn print_json(value: &Value, use_color: bool) {
    println!("{}", render_json(value, use_color));
}

/// Render a JSON value the way [`print_json`] prints it.
#[must_use]
pub fn render_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, use_color);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, use_color: bool) {
    match value {
        Value::Null => out.push_str(&paint("null", use_color, |s| s.red().to_string())),
        Value::Bool(b) => {
            out.push_str(&paint(&b.to_string(), use_color, |s| s.magenta().to_string()));
        }
        Value::Number(n) => {
            out.push_str(&paint(&n.to_string(), use_color, |s| s.yellow().to_string()));
        }
        Value::String(s) => {
            out.push_str(&paint(&quote(s), use_color, |s| s.green().to_string()));
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                write_value(out, item, depth + 1, use_color);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                out.push_str(&INDENT.repeat(depth + 1));
                out.push_str(&paint(&quote(key), use_color, |s| s.cyan().to_string()));
                out.push_str(": ");
                write_value(out, item, depth + 1, use_color);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
        }
    }
}

fn paint(text: &str, use_color: bool, color: impl Fn(&str) -> String) -> String {
    if use_color {
        color(text)
    } else {
        text.to_string()
    }
}

/// JSON-escape and quote a string.
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
