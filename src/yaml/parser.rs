use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

use crate::error::ConfigError;
use crate::value::Value;

// No leading zero unless the literal is exactly `0`.
static INT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:0|[1-9][0-9]*)$").unwrap());

// Requires a dot or an exponent, so plain integers never match.
static FLOAT_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(?:[0-9]+\.[0-9]*(?:[eE][+-]?[0-9]+)?|\.[0-9]+(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)$",
    )
    .unwrap()
});

pub(super) fn is_int_literal(text: &str) -> bool {
    INT_LITERAL.is_match(text)
}

pub(super) fn is_float_literal(text: &str) -> bool {
    FLOAT_LITERAL.is_match(text)
}

/// Type inference for plain (unquoted) scalars.
///
/// `null`/`~` and `true`/`false` are matched case-insensitively. Integer
/// literals that overflow and float literals that produce a non-finite
/// value fall back to strings.
fn interpret_scalar(text: String) -> Value {
    let lower = text.to_lowercase();
    if lower == "null" || lower == "~" {
        return Value::Null;
    }
    if lower == "true" {
        return Value::Bool(true);
    }
    if lower == "false" {
        return Value::Bool(false);
    }
    if is_int_literal(&text) {
        if let Ok(parsed) = text.parse::<i64>() {
            return Value::Int(parsed);
        }
    }
    if is_float_literal(&text) {
        if let Ok(parsed) = text.parse::<f64>() {
            if parsed.is_finite() {
                return Value::Float(parsed);
            }
        }
    }
    Value::String(text)
}

#[derive(Default)]
struct EventCollector {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventCollector {
    fn on_event(&mut self, event: Event, marker: Marker) {
        self.events.push((event, marker));
    }
}

struct EventCursor {
    events: std::vec::IntoIter<(Event, Marker)>,
    name: String,
}

impl EventCursor {
    fn next(&mut self) -> Result<(Event, Marker), ConfigError> {
        self.events.next().ok_or_else(|| ConfigError::ParseError {
            message: "unexpected end of YAML event stream".to_string(),
            name: self.name.clone(),
            line: 0,
            column: 0,
            hint: None,
            code: Some(101),
        })
    }

    fn error(&self, message: impl Into<String>, marker: Marker, code: u32) -> ConfigError {
        ConfigError::ParseError {
            message: message.into(),
            name: self.name.clone(),
            line: marker.line(),
            column: marker.col() + 1,
            hint: None,
            code: Some(code),
        }
    }

    fn parse_node(&mut self, first: (Event, Marker)) -> Result<Value, ConfigError> {
        let (event, marker) = first;
        match event {
            Event::Scalar(text, style, _, tag) => {
                if style == TScalarStyle::Plain && tag.is_none() {
                    Ok(interpret_scalar(text))
                } else {
                    Ok(Value::String(text))
                }
            }
            Event::SequenceStart(..) => self.parse_sequence(),
            Event::MappingStart(..) => self.parse_mapping(),
            Event::Alias(_) => Err(self.error("YAML aliases are not supported", marker, 102)),
            other => Err(self.error(
                format!("unexpected YAML event {:?} while parsing node", other),
                marker,
                101,
            )),
        }
    }

    fn parse_sequence(&mut self) -> Result<Value, ConfigError> {
        let mut sequence = Vec::new();
        loop {
            let next = self.next()?;
            if matches!(next.0, Event::SequenceEnd) {
                return Ok(Value::Sequence(sequence));
            }
            sequence.push(self.parse_node(next)?);
        }
    }

    fn parse_mapping(&mut self) -> Result<Value, ConfigError> {
        let mut mapping = IndexMap::new();
        loop {
            let next = self.next()?;
            if matches!(next.0, Event::MappingEnd) {
                return Ok(Value::Mapping(mapping));
            }
            let key_marker = next.1;
            let key_node = self.parse_node(next)?;
            let Value::String(key) = key_node else {
                return Err(self.error(
                    format!("mapping keys must be strings, found {}", key_node.type_name()),
                    key_marker,
                    103,
                ));
            };
            let value_event = self.next()?;
            let value_node = self.parse_node(value_event)?;
            mapping.insert(key, value_node);
        }
    }

    fn parse_stream(&mut self) -> Result<Value, ConfigError> {
        let (event, marker) = self.next()?;
        if !matches!(event, Event::StreamStart) {
            return Err(self.error("YAML stream did not start correctly", marker, 101));
        }

        let (event, marker) = self.next()?;
        match event {
            Event::StreamEnd => return Ok(Value::Null),
            Event::DocumentStart => {}
            _ => return Err(self.error("expected YAML document start", marker, 101)),
        }

        let first = self.next()?;
        let root = self.parse_node(first)?;

        let (event, marker) = self.next()?;
        if !matches!(event, Event::DocumentEnd) {
            return Err(self.error("expected YAML document end", marker, 101));
        }

        let (event, marker) = self.next()?;
        if !matches!(event, Event::StreamEnd) {
            return Err(self.error(
                "expected a single YAML document, found another",
                marker,
                104,
            ));
        }

        Ok(root)
    }
}

/// Parse one YAML document into a value tree.
///
/// Aliases are rejected, an empty stream yields null, and a second document
/// in the stream is an error.
pub fn parse_document(content: &str, name: &str) -> Result<Value, ConfigError> {
    let mut parser = Parser::new_from_str(content);
    let mut collector = EventCollector::default();
    parser
        .load(&mut collector, true)
        .map_err(|e| scan_error(name, &e))?;

    let mut cursor = EventCursor {
        events: collector.events.into_iter(),
        name: name.to_string(),
    };
    cursor.parse_stream()
}

pub fn parse_file(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileError {
        message: format!("failed to read file: {}", e),
        path: path.display().to_string(),
        hint: Some("Check that the file exists and is readable".into()),
        code: Some(300),
    })?;
    parse_document(&content, &path.display().to_string())
}

fn scan_error(name: &str, error: &ScanError) -> ConfigError {
    let marker = error.marker();
    ConfigError::ParseError {
        message: error.info().to_string(),
        name: name.to_string(),
        line: marker.line(),
        column: marker.col() + 1,
        hint: None,
        code: Some(100),
    }
}
