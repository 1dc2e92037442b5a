//! XML to structured-data conversion.
//!
//! # Conversion Rules
//! - The root element becomes a single-key object `{ "<root>": value }`
//! - Element and attribute names are kept verbatim, prefixes included
//! - Attributes become string fields of their element
//! - Text-only elements become strings, empty elements become `{}`
//! - Text next to attributes or children is stored under `$t`
//! - Repeated siblings collapse into an array in document order
//!
//! # Design Decisions
//! - No schema: any well-formed document converts
//! - All-or-nothing: malformed input never yields a partial tree
//! - Nesting is capped at [`MAX_DEPTH`]; the resulting tree is dropped,
//!   serialized and rendered recursively

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Key holding an element's text when it also has attributes or children.
pub const TEXT_KEY: &str = "$t";

/// Deepest element nesting accepted.
pub const MAX_DEPTH: usize = 256;

/// The markup could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("markup conversion failed at byte {position}: {reason}")]
pub struct ConversionFailure {
    pub position: u64,
    pub reason: String,
}

impl ConversionFailure {
    fn new(position: u64, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// An element still waiting for its end tag.
struct OpenElement {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl OpenElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| format!("element name is not UTF-8: {}", e))?
            .to_string();

        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| format!("attribute name is not UTF-8: {}", e))?
                .to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            fields.insert(key, Value::String(value.into_owned()));
        }

        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn into_entry(self) -> (String, Value) {
        let text = self.text.trim();
        let value = match (self.fields.is_empty(), text.is_empty()) {
            (true, true) => Value::Object(Map::new()),
            (true, false) => Value::String(text.to_string()),
            (false, _) => {
                let mut fields = self.fields;
                if !text.is_empty() {
                    fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
                }
                Value::Object(fields)
            }
        };
        (self.name, value)
    }
}

fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

/// Tracks the element stack and the finished root while reading events.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<OpenElement>,
    root: Option<(String, Value)>,
}

impl TreeBuilder {
    fn start(&mut self, element: OpenElement) -> Result<(), String> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(format!("second root element <{}>", element.name));
        }
        if self.open.len() >= MAX_DEPTH {
            return Err(format!("nesting deeper than {} elements", MAX_DEPTH));
        }
        self.open.push(element);
        Ok(())
    }

    fn end(&mut self) -> Result<(), String> {
        let element = self.open.pop().ok_or("end tag without matching start tag")?;
        let (name, value) = element.into_entry();
        match self.open.last_mut() {
            Some(parent) => insert_child(&mut parent.fields, name, value),
            None => self.root = Some((name, value)),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), String> {
        match self.open.last_mut() {
            Some(element) => {
                element.text.push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err("text outside the root element".to_string()),
        }
    }

    fn finish(self) -> Result<Value, String> {
        if let Some(element) = self.open.last() {
            return Err(format!("unclosed element <{}>", element.name));
        }
        let (name, value) = self.root.ok_or("document has no root element")?;
        let mut document = Map::new();
        document.insert(name, value);
        Ok(Value::Object(document))
    }
}

/// Convert an XML document into a structured tree.
pub fn parse(markup: &str) -> Result<Value, ConversionFailure> {
    let mut reader = Reader::from_str(markup);
    let mut tree = TreeBuilder::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ConversionFailure::new(reader.buffer_position() as u64, e.to_string()))?;
        let position = reader.buffer_position() as u64;
        let fail = |reason: String| ConversionFailure::new(position, reason);

        match event {
            Event::Start(start) => {
                let element = OpenElement::from_start(&start).map_err(fail)?;
                tree.start(element).map_err(fail)?;
            }
            Event::Empty(start) => {
                let element = OpenElement::from_start(&start).map_err(fail)?;
                tree.start(element).map_err(fail)?;
                tree.end().map_err(fail)?;
            }
            Event::End(_) => tree.end().map_err(fail)?,
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| fail(e.to_string()))?;
                tree.text(&text).map_err(fail)?;
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|e| fail(format!("CDATA is not UTF-8: {}", e)))?;
                tree.text(text).map_err(fail)?;
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, DOCTYPE.
            _ => {}
        }
    }

    let end = reader.buffer_position() as u64;
    tree.finish().map_err(|reason| ConversionFailure::new(end, reason))
}

/// Convert a raw body; it must be UTF-8.
pub fn parse_bytes(body: &[u8]) -> Result<Value, ConversionFailure> {
    let markup = std::str::from_utf8(body).map_err(|e| {
        ConversionFailure::new(e.valid_up_to() as u64, format!("body is not UTF-8: {}", e))
    })?;
    parse(markup)
}
