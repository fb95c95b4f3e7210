#![warn(missing_docs)]
//! # Then-Notify
//! A library that provides a uniform interface for composing and sending notifications to third-party services.
//!
//! Every service is a component. A component creates messages bound to itself and each message knows how to send
//! itself.
//!
//! ## Example
//! ```
//! use then_notify::components::discord::Discord;
//! use then_notify::components::http::HttpMessage;
//! use then_notify::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let discord = Discord::new("BOT_TOKEN", "CHANNEL_ID");
//!     discord.message("A message to be sent").tts(true).send().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Templates
//! A [`Dispatch`] pairs any component with a [`FormatTemplate`][`crate::templates::FormatTemplate`] so the message
//! fields can be filled from arguments at send time.
//!
//! ```
//! use then_notify::components::homeassistant::HomeAssistant;
//! use then_notify::templates::FormatTemplate;
//! use then_notify::{Dispatch, Error};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let house = HomeAssistant::new("hass.local").with_access("ACCESS_TOKEN");
//!     let template = FormatTemplate::from([("event", "door_{state}"), ("data", r#"{{"who": "{name}"}}"#)]);
//!     Dispatch::new(Box::new(house), template).send(&json!({"state": "open", "name": "Alice"})).await
//! }
//! ```

pub mod components;
#[cfg(feature = "parse-cfg")]
mod configuration;
mod dispatch;
mod error;
pub mod templates;

#[cfg(feature = "parse-cfg")]
pub use self::configuration::{ComponentConfig, NotifyConfiguration};
pub use self::dispatch::Dispatch;
pub use self::error::{Error, HttpResponse};

/// Logging target value used for the library.
pub const LIB_LOG_TARGET: &str = "then_notify";
