use crate::components::discord::payload::{GATEWAY_QUERY, Identify};
use crate::{Error, LIB_LOG_TARGET};
use futures_util::SinkExt;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

/// Login state shared by every clone of a [`Discord`][`super::Discord`] component.
#[derive(Debug, Default)]
pub(crate) enum Session {
    #[default]
    Unauthenticated,
    /// Login succeeded. The gateway is missing when opening it failed after login.
    Connected { gateway: Option<Gateway> },
}

/// An open gateway socket. It is kept for the life of the session and never closed explicitly.
pub(crate) struct Gateway {
    url: Url,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        matches!(self, Session::Connected { .. })
    }

    pub fn has_gateway(&self) -> bool {
        matches!(self, Session::Connected { gateway: Some(_) })
    }

    pub fn set_gateway(&mut self, value: Gateway) {
        if let Session::Connected { gateway } = self {
            *gateway = Some(value);
        }
    }
}

impl Gateway {
    /// Open a socket to the discovered gateway address, giving up after `limit`.
    pub async fn open(address: &str, limit: Duration) -> Result<Self, Error> {
        let mut url = Url::parse(address)?;
        url.set_query(Some(GATEWAY_QUERY));
        debug!(target: LIB_LOG_TARGET, "Opening Discord gateway: {}", url);

        let (stream, _) = timeout(limit, connect_async(url.as_str()))
            .await
            .map_err(|_| Error::execute(format!("Opening Discord gateway {} timed out after {:?}", url, limit)))?
            .map_err(|e| Error::execute(format!("Unable to open Discord gateway {}: {}", url, e)))?;
        Ok(Self { url, stream })
    }

    /// Send the identify frame without waiting for an answer.
    pub async fn identify(&mut self, token: &str, limit: Duration) -> Result<(), Error> {
        let frame = Identify::new(token).to_json()?;
        timeout(limit, self.stream.send(Message::text(frame)))
            .await
            .map_err(|_| Error::execute(format!("Identify on Discord gateway {} timed out after {:?}", self.url, limit)))?
            .map_err(|e| Error::execute(format!("Unable to identify on Discord gateway {}: {}", self.url, e)))
    }
}

impl Debug for Gateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").field("url", &self.url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_only_set_after_login() {
        let mut session = Session::default();
        assert!(!session.is_connected());

        session = Session::Connected { gateway: None };
        assert!(session.is_connected());
        assert!(!session.has_gateway());
    }

    #[tokio::test]
    async fn open_rejects_invalid_address() {
        let result = Gateway::open("not a url", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::UrlParseError(_))));
    }

    #[tokio::test]
    async fn open_gives_up_on_silent_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept the TCP connection but never answer the upgrade request.
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let result = Gateway::open(&address, Duration::from_millis(200)).await;
        assert!(matches!(result, Err(Error::Execute(_))));
    }
}
