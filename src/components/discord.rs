//! Discord bot [`Component`] and channel message implementation
//!
//! Discord only accepts channel messages from a bot that has logged in and identified on the gateway at least once.
//! [`DiscordMessage::send`] does this lazily: when the first send is rejected with `400 Bad Request` the component
//! logs in, opens the gateway, identifies and sends the message one more time.
//!
//! # Configuration Example
//! ```toml
//! [[component]]
//! type = "discord"
//! name = "alerts"
//! token = "NDF4NGQ5GzY6OTF3MAk2vDc1.D1xvWv.nMarFQh3UdjaDLXZZggL1xxxxxx"
//! to = "48014601482xxxx01"
//! bot_token = true
//! timeout = 15
//! ```

mod gateway;
pub(crate) mod payload;

use crate::components::discord::gateway::{Gateway, Session};
use crate::components::discord::payload::{GatewayDiscovery, MessagePayload};
use crate::components::http::{Headers, HttpComponent, HttpMessage, send_http};
use crate::components::{Component, DEFAULT_TIMEOUT, Fields, json_field, required_field};
use crate::{Error, LIB_LOG_TARGET};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default Discord REST API base.
pub const DEFAULT_API_BASE: &str = "https://discordapp.com/api/v6";
const DEFAULT_NAME: &str = "discord";

/// Data structure to represent the Discord [`Component`].
///
/// Clones share the login session, so a handshake done through one clone is seen by all of them. Every step of the
/// handshake, including opening the gateway socket and sending identify, is bounded by the component timeout.
///
/// The handshake runs while the session is locked. A clone whose send is rejected with `400` while another clone is
/// in the middle of the handshake waits for it, finds the session connected and returns its `400` without resending.
#[derive(Clone)]
pub struct Discord {
    name: String,
    token: String,
    to: String,
    bot_token: bool,
    timeout: Duration,
    api_base: String,
    client: Client,
    session: Arc<Mutex<Session>>,
}

/// A channel message created by [`Discord::message`].
#[derive(Debug, Clone)]
pub struct DiscordMessage<'a> {
    component: &'a Discord,
    body: String,
    tts: bool,
    embed: Option<Value>,
}

impl Discord {
    /// Create a new `Discord` component for a bot token and channel id.
    pub fn new<S: AsRef<str>>(token: S, to: S) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            token: token.as_ref().to_string(),
            to: to.as_ref().to_string(),
            bot_token: true,
            timeout: DEFAULT_TIMEOUT,
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    /// Set the component name.
    pub fn with_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.name = name.as_ref().to_string();
        self
    }

    /// Set whether the token is a bot token (`Authorization: Bot <token>`) or a user token.
    pub fn with_bot_token(mut self, bot_token: bool) -> Self {
        self.bot_token = bot_token;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use another REST API base, without trailing slash.
    pub fn with_api_base<S: AsRef<str>>(mut self, api_base: S) -> Self {
        self.api_base = api_base.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Create a message for the configured channel.
    pub fn message<S: AsRef<str>>(&self, body: S) -> DiscordMessage<'_> {
        DiscordMessage { component: self, body: body.as_ref().to_string(), tts: false, embed: None }
    }

    /// Return the channel id.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Return the REST API base.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Return `true` once the login step of the handshake has succeeded.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_connected()
    }

    /// Return `true` when a gateway socket is held open.
    pub async fn has_gateway(&self) -> bool {
        self.session.lock().await.has_gateway()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Check the token against the current user endpoint and mark the session connected.
    async fn login(&self, session: &mut Session) -> Result<(), Error> {
        let url = self.api_url("users/@me");
        let response = self
            .authorized_get(&url)
            .send()
            .await
            .map_err(|e| Error::execute(format!("Unknown error on {}: {}", self.name, e)))?;

        match response.status() {
            status if status.is_success() => {
                debug!(target: LIB_LOG_TARGET, "Discord login accepted for {}", self.name);
                *session = Session::Connected { gateway: None };
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(Error::validation("Improper token has been passed.")),
            status => Err(Error::execute(format!("Unknown error on {}: login returned {}", self.name, status))),
        }
    }

    /// Discover the gateway address and open a socket to it.
    async fn create_gateway(&self) -> Result<Gateway, Error> {
        let url = self.api_url("gateway");
        let discovery: GatewayDiscovery = self
            .authorized_get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::execute(format!("Unable to discover gateway on {}: {}", self.name, e)))?
            .json()
            .await
            .map_err(|e| Error::execute(format!("Invalid gateway response on {}: {}", self.name, e)))?;

        Gateway::open(&discovery.url, self.timeout).await
    }

    /// Open the gateway and identify, keeping the socket in the session.
    async fn connect(&self, session: &mut Session) -> Result<(), Error> {
        let mut gateway = self.create_gateway().await?;
        gateway.identify(&self.token, self.timeout).await?;
        info!(target: LIB_LOG_TARGET, "Identified on Discord gateway for {}", self.name);
        session.set_gateway(gateway);
        Ok(())
    }

    async fn handshake(&self, session: &mut Session) -> Result<(), Error> {
        self.login(session).await?;
        self.connect(session).await
    }

    fn authorized_get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url).timeout(self.timeout);
        for (name, value) in self.headers() {
            request = request.header(name, value);
        }
        request
    }
}

impl DiscordMessage<'_> {
    /// Ask Discord to read the message out loud.
    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    /// Attach an embed object.
    pub fn embed(mut self, embed: Value) -> Self {
        self.embed = Some(embed);
        self
    }

    /// Return the message text.
    pub fn text(&self) -> &str {
        &self.body
    }
}

impl Debug for Discord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discord")
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .field("to", &self.to)
            .field("bot_token", &self.bot_token)
            .field("timeout", &self.timeout)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[async_trait]
impl Component for Discord {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_fields(&self, fields: &Fields) -> Result<(), Error> {
        let body = required_field(fields, "body", &self.name)?;
        let tts = match fields.get("tts").map(|value| value.trim()) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => return Err(Error::validation(format!("field 'tts' expects true or false, got {}", other))),
        };

        let mut message = self.message(body).tts(tts);
        if let Some(embed) = json_field(fields, "embed")? {
            message = message.embed(embed);
        }
        message.send().await
    }
}

impl HttpComponent for Discord {
    fn client(&self) -> &Client {
        &self.client
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn headers(&self) -> Headers {
        let authorization = match self.bot_token {
            true => format!("Bot {}", self.token),
            false => self.token.clone(),
        };
        Headers::from([("Authorization".to_string(), authorization)])
    }
}

#[async_trait]
impl<'a> HttpMessage for DiscordMessage<'a> {
    type Component = Discord;

    fn component(&self) -> &Discord {
        self.component
    }

    fn url(&self) -> Result<String, Error> {
        Ok(self.component.api_url(&format!("channels/{}/messages", self.component.to)))
    }

    fn body(&self) -> Value {
        MessagePayload::new(&self.body, self.tts, self.embed.as_ref()).to_value()
    }

    /// Send the message, logging in and identifying first if Discord asks for it.
    ///
    /// Only a `400` received while the session is unauthenticated triggers the handshake, and the message is then
    /// sent exactly one more time. Every other failure is returned unchanged.
    async fn send(&self) -> Result<(), Error> {
        match send_http(self).await {
            Err(Error::HttpStatus(response)) if response.status == StatusCode::BAD_REQUEST.as_u16() => {
                let mut session = self.component.session.lock().await;
                if session.is_connected() {
                    return Err(Error::HttpStatus(response));
                }

                info!(target: LIB_LOG_TARGET, "{} rejected a message before login, starting handshake", self.component.name);
                if let Err(error) = self.component.handshake(&mut session).await {
                    warn!(target: LIB_LOG_TARGET, "Discord handshake failed for {}: {}", self.component.name, error);
                    return Err(error);
                }
                drop(session);

                send_http(self).await
            }
            other => other,
        }
    }
}

#[cfg(feature = "parse-cfg")]
mod config {
    use super::{DEFAULT_NAME, Discord};
    use crate::Error;
    use crate::components::Component;
    use crate::configuration::{ComponentConfig, timeout_from_secs};
    use serde::Deserialize;

    fn default_bot_token() -> bool {
        true
    }

    /// Data structure to represent the Discord [`ComponentConfig`].
    #[derive(Debug, Deserialize, PartialEq, Eq, Hash, Clone)]
    pub(crate) struct DiscordConfigFile {
        name: Option<String>,
        token: String,
        to: String,
        #[serde(default = "default_bot_token")]
        bot_token: bool,
        timeout: Option<i64>,
        api_base: Option<String>,
    }

    #[typetag::deserialize(name = "discord")]
    impl ComponentConfig for DiscordConfigFile {
        fn to_component(&self) -> Result<Box<dyn Component>, Error> {
            Ok(Box::new(Discord::try_from(self)?))
        }
    }

    impl TryFrom<&DiscordConfigFile> for Discord {
        type Error = Error;

        fn try_from(value: &DiscordConfigFile) -> Result<Self, Self::Error> {
            if value.token.trim().is_empty() {
                return Err(Error::invalid_component_configuration("Discord configuration token is blank"));
            }
            if value.to.trim().is_empty() {
                return Err(Error::invalid_component_configuration("Discord configuration channel 'to' is blank"));
            }

            let mut discord = Discord::new(value.token.as_str(), value.to.as_str())
                .with_name(value.name.as_deref().unwrap_or(DEFAULT_NAME))
                .with_bot_token(value.bot_token);
            if let Some(timeout) = value.timeout {
                discord = discord.with_timeout(timeout_from_secs(timeout)?);
            }
            if let Some(api_base) = &value.api_base {
                discord = discord.with_api_base(api_base);
            }
            Ok(discord)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bot_token_header() {
        let discord = Discord::new("T", "C");
        assert_eq!(discord.headers().get("Authorization").map(String::as_str), Some("Bot T"));
    }

    #[test]
    fn user_token_header() {
        let discord = Discord::new("T", "C").with_bot_token(false);
        assert_eq!(discord.headers().get("Authorization").map(String::as_str), Some("T"));
    }

    #[test]
    fn message_url_and_body() {
        let discord = Discord::new("T", "480146").with_api_base("http://localhost:9000/api/");
        let message = discord.message("hi").embed(json!({"title": "t"}));

        assert_eq!(message.url().unwrap(), "http://localhost:9000/api/channels/480146/messages");
        assert_eq!(message.body(), json!({"content": "hi", "embed": {"title": "t"}}));
    }

    #[test]
    fn default_api_base() {
        let message_url = Discord::new("T", "C").message("hi").url().unwrap();
        assert_eq!(message_url, "https://discordapp.com/api/v6/channels/C/messages");
    }

    #[test]
    fn debug_redacts_token() {
        let debug_output = format!("{:?}", Discord::new("super-secret", "C"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret"));
    }

    #[tokio::test]
    async fn send_fields_requires_body() {
        let discord = Discord::new("T", "C");
        let result = discord.send_fields(&Fields::new()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn send_fields_rejects_bad_tts() {
        let discord = Discord::new("T", "C");
        let fields = Fields::from([("body".to_string(), "hi".to_string()), ("tts".to_string(), "maybe".to_string())]);
        let result = discord.send_fields(&fields).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn starts_unauthenticated() {
        let discord = Discord::new("T", "C");
        assert!(!discord.is_connected().await);
        assert!(!discord.has_gateway().await);
    }
}
