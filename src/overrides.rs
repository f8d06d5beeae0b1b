//! Command-line override expressions: `path=value` or `+path=value`.

use crate::error::ConfigError;
use crate::path::parse_path;
use crate::value::Value;
use crate::yaml::parse_document;

/// A parsed override expression.
///
/// `require_new=true` (the `+` prefix) means the override must create a new
/// mapping key and fails if the key already exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: Vec<String>,
    pub value: Value,
    pub require_new: bool,
}

/// Parse the value side with the document scalar/collection grammar, so
/// `42` is an int, `true` a bool, `[...]` a sequence, and so on.
fn parse_value_expression(expression: &str) -> Result<Value, ConfigError> {
    let snippet = format!("value: {}\n", expression);
    let wrapper = parse_document(&snippet, "<override>")?;
    let Value::Mapping(mut map) = wrapper else {
        return Err(ConfigError::ParseError {
            message: "override value parsing produced an unexpected structure".to_string(),
            name: "<override>".to_string(),
            line: 0,
            column: 0,
            hint: None,
            code: Some(603),
        });
    };
    map.shift_remove("value").ok_or_else(|| ConfigError::ParseError {
        message: "override value parsing lost the wrapper key".to_string(),
        name: "<override>".to_string(),
        line: 0,
        column: 0,
        hint: None,
        code: Some(603),
    })
}

/// Split an expression at its first unescaped `=`.
fn split_at_equals(expression: &str) -> Option<(&str, &str)> {
    let mut escape = false;
    for (idx, ch) in expression.char_indices() {
        if escape {
            escape = false;
        } else if ch == '\\' {
            escape = true;
        } else if ch == '=' {
            return Some((&expression[..idx], &expression[idx + 1..]));
        }
    }
    None
}

pub fn parse_override(expression: &str) -> Result<Override, ConfigError> {
    let (require_new, working) = match expression.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, expression),
    };

    if require_new && working.is_empty() {
        return Err(ConfigError::EmptyKey {
            expression: expression.to_string(),
            hint: Some("Write '+some.key=value' to add a new key".into()),
            code: Some(601),
        });
    }

    let Some((path_part, value_part)) = split_at_equals(working) else {
        return Err(ConfigError::MissingEquals {
            expression: expression.to_string(),
            hint: Some("Overrides look like 'some.key=value'".into()),
            code: Some(600),
        });
    };

    if path_part.is_empty() {
        return Err(ConfigError::EmptyKey {
            expression: expression.to_string(),
            hint: None,
            code: Some(601),
        });
    }
    if value_part.is_empty() {
        return Err(ConfigError::EmptyValue {
            expression: expression.to_string(),
            hint: Some("Use 'key=null' to clear a value".into()),
            code: Some(602),
        });
    }

    let path = parse_path(path_part)?;
    let value = parse_value_expression(value_part)?;

    Ok(Override {
        path,
        value,
        require_new,
    })
}
