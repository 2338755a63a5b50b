//! Wire shapes of the stream protocol.
//!
//! Outbound: one connect request carrying the session token, then one
//! subscribe request per channel. Inbound: replies of the form
//! `{"id": n, "result": {...}}` or `{"result": {"channel": c, "data": {...}}}`
//! for publications; a single text frame may hold several replies, one per
//! line.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method code for a subscribe request.
pub const METHOD_SUBSCRIBE: u8 = 1;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectParams {
    pub token: String,
}

/// `{"params":{"token":"…"},"id":1}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectRequest {
    pub params: ConnectParams,
    pub id: u64,
}

impl ConnectRequest {
    pub fn new(token: impl Into<String>, id: u64) -> Self {
        Self {
            params: ConnectParams { token: token.into() },
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscribeParams {
    pub channel: String,
}

/// `{"method":1,"params":{"channel":"…"},"id":n}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub method: u8,
    pub params: SubscribeParams,
    pub id: u64,
}

impl SubscribeRequest {
    pub fn new(channel: impl Into<String>, id: u64) -> Self {
        Self {
            method: METHOD_SUBSCRIBE,
            params: SubscribeParams {
                channel: channel.into(),
            },
            id,
        }
    }
}

/// Body of a reply's `result`. Publications carry `channel` and `data`;
/// acknowledgements carry neither.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyResult {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

/// One inbound reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundReply {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<ReplyResult>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl InboundReply {
    /// `(channel, data)` if this reply is a publication.
    pub fn publication(&self) -> Option<(&str, &Map<String, Value>)> {
        let result = self.result.as_ref()?;
        Some((result.channel.as_deref()?, result.data.as_ref()?))
    }
}

/// The non-blank lines of a text frame.
pub fn split_replies(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

pub fn parse_reply(line: &str) -> Result<InboundReply, serde_json::Error> {
    serde_json::from_str(line)
}
