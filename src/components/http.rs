//! Generic HTTP message flow shared by the HTTP based components

use crate::components::Component;
use crate::{Error, HttpResponse, LIB_LOG_TARGET};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// HTTP headers as name and value pairs.
pub type Headers = HashMap<String, String>;

/// A [`Component`] that talks to its service over HTTP.
pub trait HttpComponent: Component {
    /// Client used for every request of this component.
    fn client(&self) -> &Client;

    /// HTTP method used to send messages.
    fn method(&self) -> Method {
        Method::POST
    }

    /// Request timeout.
    fn timeout(&self) -> Duration;

    /// Headers added to every request, usually authentication.
    fn headers(&self) -> Headers;
}

/// A message bound to an [`HttpComponent`].
#[async_trait]
pub trait HttpMessage: Send + Sync {
    /// The component that created this message.
    type Component: HttpComponent;

    /// Return the owning component.
    fn component(&self) -> &Self::Component;

    /// URL the message is sent to.
    fn url(&self) -> Result<String, Error>;

    /// Headers for this message.
    fn headers(&self) -> Headers {
        self.component().headers()
    }

    /// JSON body for this message.
    fn body(&self) -> Value;

    /// Send the message once.
    async fn send(&self) -> Result<(), Error> {
        send_http(self).await
    }
}

/// Issue the request described by an [`HttpMessage`].
///
/// Non-2xx responses become [`Error::HttpStatus`] and transport failures become [`Error::Execute`]. Nothing is retried.
pub async fn send_http<M>(message: &M) -> Result<(), Error>
where
    M: HttpMessage + ?Sized,
{
    let component = message.component();
    let url = message.url()?;
    let method = component.method();
    debug!(target: LIB_LOG_TARGET, "{} request: {} {}", component.name(), method, url);

    let mut request = component.client().request(method, url.as_str()).timeout(component.timeout());
    for (name, value) in message.headers() {
        request = request.header(name, value);
    }

    let response = request
        .json(&message.body())
        .send()
        .await
        .map_err(|e| Error::execute(format!("{} request to {} failed: {}", component.name(), url, e)))?;

    let status = response.status();
    debug!(target: LIB_LOG_TARGET, "{} response - status: {} url: {}", component.name(), status, response.url());
    match status.is_success() {
        true => Ok(()),
        false => Err(Error::HttpStatus(HttpResponse {
            status: status.as_u16(),
            url: response.url().to_string(),
            body: response.text().await.unwrap_or_default(),
        })),
    }
}
