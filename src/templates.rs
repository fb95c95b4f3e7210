//! Templates that turn arguments into message [`Fields`]
//!
//! A [`FormatTemplate`] holds one template string per field. Placeholders use the `{name}` syntax, `{{` and `}}`
//! produce literal braces and nested values are reached with `{user.name}` or `{items[0]}`.
//!
//! ```
//! use then_notify::templates::{FormatTemplate, Template};
//! use serde_json::json;
//!
//! let template = FormatTemplate::from([("body", "Hello {name}")]);
//! let fields = template.render(&json!({"name": "World"})).unwrap();
//! assert_eq!(fields["body"], "Hello World");
//! ```

use crate::Error;
use crate::components::Fields;
use serde_json::Value;
use std::collections::HashMap;

/// Something that renders message [`Fields`] from arguments.
pub trait Template {
    /// Render every field, failing on the first field that cannot be rendered.
    fn render(&self, args: &Value) -> Result<Fields, Error>;
}

/// Per-field format strings with named placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatTemplate {
    context: HashMap<String, String>,
}

impl FormatTemplate {
    /// Create a new `FormatTemplate` from field names and their format strings.
    pub fn new(context: HashMap<String, String>) -> Self {
        Self { context }
    }

    /// Return the format string of every field.
    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }
}

impl<K: AsRef<str>, V: AsRef<str>, const N: usize> From<[(K, V); N]> for FormatTemplate {
    fn from(value: [(K, V); N]) -> Self {
        let context = value.iter().map(|(key, format)| (key.as_ref().to_string(), format.as_ref().to_string())).collect();
        Self { context }
    }
}

impl Template for FormatTemplate {
    fn render(&self, args: &Value) -> Result<Fields, Error> {
        self.context
            .iter()
            .map(|(key, template)| {
                format(template, args)
                    .map(|value| (key.clone(), value))
                    .map_err(|e| Error::template(format!("field '{}': {}", key, e)))
            })
            .collect()
    }
}

#[derive(Debug, PartialEq)]
enum FormatError {
    UnmatchedOpen,
    UnmatchedClose,
    EmptyField,
    FormatSpec(String),
    Missing(String),
    InvalidField(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::UnmatchedOpen => write!(f, "single '{{' encountered in format string"),
            FormatError::UnmatchedClose => write!(f, "single '}}' encountered in format string"),
            FormatError::EmptyField => write!(f, "positional placeholder '{{}}' is not supported"),
            FormatError::FormatSpec(field) => write!(f, "format specification in '{{{}}}' is not supported", field),
            FormatError::Missing(field) => write!(f, "missing argument for placeholder '{}'", field),
            FormatError::InvalidField(field) => write!(f, "invalid placeholder '{}'", field),
        }
    }
}

/// Substitute every placeholder of `template` from `args`.
fn format(template: &str, args: &Value) -> Result<String, FormatError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                output.push('{');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(FormatError::UnmatchedOpen),
                        Some(other) => field.push(other),
                    }
                }
                output.push_str(&render_value(lookup(&field, args)?));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                output.push('}');
            }
            '}' => return Err(FormatError::UnmatchedClose),
            other => output.push(other),
        }
    }

    Ok(output)
}

/// Resolve `name`, `name.attr` and `name[index]` against the arguments.
fn lookup<'a>(field: &str, args: &'a Value) -> Result<&'a Value, FormatError> {
    if field.is_empty() {
        return Err(FormatError::EmptyField);
    }
    if field.contains([':', '!']) {
        return Err(FormatError::FormatSpec(field.to_string()));
    }

    let missing = || FormatError::Missing(field.to_string());
    let invalid = || FormatError::InvalidField(field.to_string());

    let mut value = args;
    let mut rest = field;
    let mut first = true;
    while !rest.is_empty() {
        let (key, remaining) = match rest.as_bytes()[0] {
            b'.' if !first => split_name(&rest[1..]),
            b'[' if !first => {
                let end = rest.find(']').ok_or_else(invalid)?;
                (&rest[1..end], &rest[end + 1..])
            }
            _ if first => split_name(rest),
            _ => return Err(invalid()),
        };
        if key.is_empty() {
            return Err(invalid());
        }

        value = match value {
            Value::Object(map) => map.get(key).ok_or_else(missing)?,
            Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)).ok_or_else(missing)?,
            _ => return Err(missing()),
        };
        rest = remaining;
        first = false;
    }

    Ok(value)
}

fn split_name(field: &str) -> (&str, &str) {
    let end = field.find(['.', '[']).unwrap_or(field.len());
    field.split_at(end)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_replaces_named_placeholder() {
        let template = FormatTemplate::from([("a", "Hello {name}")]);
        let fields = template.render(&json!({"name": "World"})).unwrap();
        assert_eq!(fields, Fields::from([("a".to_string(), "Hello World".to_string())]));
    }

    #[test]
    fn render_keeps_every_key() {
        let template = FormatTemplate::from([("event", "door_{state}"), ("data", "static")]);
        let fields = template.render(&json!({"state": "open"})).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["event"], "door_open");
        assert_eq!(fields["data"], "static");
    }

    #[test]
    fn missing_placeholder_is_an_error() {
        let template = FormatTemplate::from([("a", "Hello {name}")]);
        let result = template.render(&json!({"other": "World"}));
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[test]
    fn missing_placeholder_with_non_object_args() {
        assert_eq!(format("{name}", &Value::Null), Err(FormatError::Missing("name".to_string())));
    }

    #[test]
    fn escaped_braces() {
        assert_eq!(format(r#"{{"who": "{name}"}}"#, &json!({"name": "Alice"})).unwrap(), r#"{"who": "Alice"}"#);
    }

    #[test]
    fn nested_lookup() {
        let args = json!({"user": {"name": "Alice", "tags": ["admin", "ops"]}, "count": 3});
        assert_eq!(format("{user.name} is {user.tags[1]}", &args).unwrap(), "Alice is ops");
        assert_eq!(format("{count} new", &args).unwrap(), "3 new");
        assert_eq!(format("{user.tags[5]}", &args), Err(FormatError::Missing("user.tags[5]".to_string())));
    }

    #[test]
    fn non_string_values_use_json() {
        let args = json!({"flag": true, "none": null, "list": [1, 2]});
        assert_eq!(format("{flag} {none} {list}", &args).unwrap(), "true null [1,2]");
    }

    #[test]
    fn malformed_templates() {
        let args = json!({"name": "x"});
        assert_eq!(format("{name", &args), Err(FormatError::UnmatchedOpen));
        assert_eq!(format("name}", &args), Err(FormatError::UnmatchedClose));
        assert_eq!(format("{}", &args), Err(FormatError::EmptyField));
        assert_eq!(format("{name:>4}", &args), Err(FormatError::FormatSpec("name:>4".to_string())));
        assert_eq!(format("{name.}", &args), Err(FormatError::InvalidField("name.".to_string())));
    }
}
