use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const GATEWAY_QUERY: &str = "encoding=json&v=6";
const IDENTIFY_OP: u8 = 2;
const LARGE_THRESHOLD: u16 = 250;
const GATEWAY_PROTOCOL_VERSION: u8 = 3;
const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");

/// Body of a channel message.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub(crate) struct MessagePayload<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed: Option<&'a Value>,
}

/// Response of the gateway discovery endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct GatewayDiscovery {
    pub url: String,
}

/// First frame sent on a freshly opened gateway.
#[derive(Debug, Serialize)]
pub(crate) struct Identify<'a> {
    op: u8,
    d: IdentifyData<'a>,
}

#[derive(Debug, Serialize)]
struct IdentifyData<'a> {
    token: &'a str,
    properties: ClientProperties,
    compress: bool,
    large_threshold: u16,
    v: u8,
}

#[derive(Debug, Serialize)]
struct ClientProperties {
    #[serde(rename = "$os")]
    os: &'static str,
    #[serde(rename = "$browser")]
    browser: &'static str,
    #[serde(rename = "$device")]
    device: &'static str,
    #[serde(rename = "$referrer")]
    referrer: &'static str,
    #[serde(rename = "$referring_domain")]
    referring_domain: &'static str,
}

impl<'a> MessagePayload<'a> {
    pub fn new(content: &'a str, tts: bool, embed: Option<&'a Value>) -> Self {
        Self { content, tts, embed }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl<'a> Identify<'a> {
    pub fn new(token: &'a str) -> Self {
        Self {
            op: IDENTIFY_OP,
            d: IdentifyData {
                token,
                properties: ClientProperties {
                    os: std::env::consts::OS,
                    browser: CLIENT_NAME,
                    device: CLIENT_NAME,
                    referrer: "",
                    referring_domain: "",
                },
                compress: true,
                large_threshold: LARGE_THRESHOLD,
                v: GATEWAY_PROTOCOL_VERSION,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_omits_unset_flags() {
        let payload = MessagePayload::new("some message", false, None);
        assert_eq!(payload.to_value(), json!({"content": "some message"}));
    }

    #[test]
    fn payload_with_tts_and_embed() {
        let embed = json!({"title": "hello"});
        let payload = MessagePayload::new("some message", true, Some(&embed));
        assert_eq!(payload.to_value(), json!({"content": "some message", "tts": true, "embed": {"title": "hello"}}));
    }

    #[test]
    fn identify_frame() {
        let frame: Value = serde_json::from_str(&Identify::new("T").to_json().unwrap()).unwrap();
        assert_eq!(frame["op"], 2);
        assert_eq!(frame["d"]["token"], "T");
        assert_eq!(frame["d"]["compress"], true);
        assert_eq!(frame["d"]["large_threshold"], 250);
        assert_eq!(frame["d"]["v"], 3);
        assert_eq!(frame["d"]["properties"]["$os"], std::env::consts::OS);
        assert_eq!(frame["d"]["properties"]["$browser"], "then-notify");
        assert_eq!(frame["d"]["properties"]["$referrer"], "");
    }
}
