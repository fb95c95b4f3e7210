//! Components that send messages to external services

use crate::Error;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

#[cfg(feature = "discord")]
pub mod discord;
#[cfg(feature = "homeassistant")]
pub mod homeassistant;
pub mod http;

/// Named message fields, usually the output of a [`Template`][`crate::templates::Template`].
pub type Fields = HashMap<String, String>;

/// Seconds a component waits for a service before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// A configured connection to an external service that can send messages.
///
/// Vendor types also offer a typed `message` builder; this trait is the uniform entry point used when components of
/// different kinds are handled together.
#[async_trait]
pub trait Component: DynClone + Send + Sync + Debug {
    /// Name used to identify this `Component` in configuration and logs.
    fn name(&self) -> &str;

    /// Build a message from named fields and send it.
    async fn send_fields(&self, fields: &Fields) -> Result<(), Error>;
}

dyn_clone::clone_trait_object!(Component);

pub(crate) fn required_field<'a>(fields: &'a Fields, name: &str, component: &str) -> Result<&'a str, Error> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| Error::validation(format!("{} message requires the '{}' field", component, name)))
}

pub(crate) fn json_field(fields: &Fields, name: &str) -> Result<Option<serde_json::Value>, Error> {
    match fields.get(name) {
        None => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| Error::validation(format!("field '{}' is not valid JSON: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn missing_required_field_is_validation_error() {
        let fields = fields(&[("other", "x")]);
        let result = required_field(&fields, "body", "discord");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn json_field_parses_object() {
        let value = json_field(&fields(&[("data", r#"{"a": 1}"#)]), "data").unwrap();
        assert_eq!(value, Some(serde_json::json!({"a": 1})));
        assert_eq!(json_field(&fields(&[]), "data").unwrap(), None);
    }

    #[test]
    fn json_field_rejects_garbage() {
        let result = json_field(&fields(&[("data", "{not json")]), "data");
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
