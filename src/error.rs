use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors returned by then-notify library.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied credentials or parameters that can never succeed, such as an improper token.
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Runtime failure while talking to an external service.
    #[error("Execute Error: {0}")]
    Execute(String),

    /// A service answered with a non-2xx status.
    #[error("HTTP Error: {0}")]
    HttpStatus(HttpResponse),

    /// A [`Template`][`crate::templates::Template`] could not be rendered.
    #[error("Template Error: {0}")]
    Template(String),

    /// At least one [`Component`][`crate::components::Component`] needs to be defined in a configuration.
    #[error("At least one component must be defined")]
    MissingComponent,

    /// Two components in one configuration share a name.
    #[error("Component name {0} is used more than once")]
    DuplicateComponentName(String),

    /// Validation failed for a component configuration.
    #[error("Invalid Component Configuration: {0}")]
    InvalidComponentConfiguration(String),

    /// Port needs to be in a valid u16 range.
    #[error("Invalid port number, valid u16 value expected and got {0}")]
    InvalidPortNumber(i64),

    // ### Converting from other error types ###
    /// Pass-thru `serde_json::Error`.
    #[error("Serde_json Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Pass-thru `url::ParseError`.
    #[error("Url Parse Error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[cfg(feature = "parse-cfg")]
    /// Pass-thru `toml::de::Error`.
    #[error("Serde Toml Error: {0}")]
    SerdeTomlError(#[from] toml::de::Error),
}

/// The parts of a non-2xx response kept for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code.
    pub status: u16,
    /// Final URL of the request.
    pub url: String,
    /// Response body as text, empty if it could not be read.
    pub body: String,
}

impl Error {
    /// Create an [`Error::Validation`].
    pub fn validation(message: impl Display) -> Self {
        Self::Validation(message.to_string())
    }

    /// Create an [`Error::Execute`].
    pub fn execute(message: impl Display) -> Self {
        Self::Execute(message.to_string())
    }

    /// Create an [`Error::Template`].
    pub fn template(message: impl Display) -> Self {
        Self::Template(message.to_string())
    }

    /// Create an [`Error::InvalidComponentConfiguration`].
    pub fn invalid_component_configuration(message: impl Display) -> Self {
        Self::InvalidComponentConfiguration(message.to_string())
    }

    /// Return the response status when this is an [`Error::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus(response) => Some(response.status),
            _ => None,
        }
    }
}

impl Display for HttpResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "status {} from {}", self.status, self.url)
    }
}
