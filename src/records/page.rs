//! Page rendering for summary records.
//!
//! The formatter only depends on [`PageRenderer`]; [`SummaryPageRenderer`] is
//! the built-in HTML view and can be swapped for a deployment-specific one.

use std::fmt::Write;

use quick_xml::escape::escape;
use serde_json::Value;

use crate::records::{local_part, markup::TEXT_KEY};

/// Options passed along with the record to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap the view in a complete HTML document.
    pub layout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("page render failed: {0}")]
pub struct RenderError(pub String);

/// Turns a summary record subtree into HTML.
pub trait PageRenderer: Send + Sync {
    fn render(&self, record: &Value, options: RenderOptions) -> Result<String, RenderError>;
}

/// Generic view: the record title as a heading, then every field as a
/// definition list. Namespace declarations are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryPageRenderer;

impl PageRenderer for SummaryPageRenderer {
    fn render(&self, record: &Value, options: RenderOptions) -> Result<String, RenderError> {
        let title = record_title(record).unwrap_or("Metadata Record");

        let mut fragment = String::new();
        write_fragment(&mut fragment, title, record)
            .map_err(|e| RenderError(e.to_string()))?;

        if !options.layout {
            return Ok(fragment);
        }

        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape(title),
            fragment
        ))
    }
}

fn record_title(record: &Value) -> Option<&str> {
    let fields = record.as_object()?;
    fields
        .iter()
        .find(|(key, _)| local_part(key) == "title")
        .and_then(|(_, value)| text_of(value))
}

/// Plain text of a scalar, or of an element that only adds attributes to its text.
fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(fields) => fields.get(TEXT_KEY).and_then(Value::as_str),
        _ => None,
    }
}

fn is_namespace_declaration(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

fn write_fragment(out: &mut String, title: &str, record: &Value) -> std::fmt::Result {
    writeln!(out, "<article class=\"record\">")?;
    writeln!(out, "<h1>{}</h1>", escape(title))?;
    write_value(out, record)?;
    writeln!(out, "</article>")
}

fn write_value(out: &mut String, value: &Value) -> std::fmt::Result {
    match value {
        Value::Object(fields) => {
            writeln!(out, "<dl>")?;
            for (key, field) in fields {
                if is_namespace_declaration(key) {
                    continue;
                }
                let label = if key == TEXT_KEY { "value" } else { local_part(key) };
                write!(out, "<dt>{}</dt><dd>", escape(label))?;
                write_value(out, field)?;
                writeln!(out, "</dd>")?;
            }
            writeln!(out, "</dl>")
        }
        Value::Array(items) => {
            write!(out, "<ul>")?;
            for item in items {
                write!(out, "<li>")?;
                write_value(out, item)?;
                write!(out, "</li>")?;
            }
            write!(out, "</ul>")
        }
        Value::String(s) => write!(out, "{}", escape(s.as_str())),
        Value::Null => Ok(()),
        other => write!(out, "{}", other),
    }
}
