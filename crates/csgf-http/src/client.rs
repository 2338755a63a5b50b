//! `HttpVenueClient`: venue actions as multipart POSTs, backed by `reqwest`.
//!
//! Every action goes through one [`SendThrottle`], and an async lock is held
//! from the throttle wait to the end of the request, so at most one action
//! is in flight and successful sends are spaced by the configured interval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::Form;
use serde::Deserialize;
use tokio::sync::Mutex;

use csgf_core::policy::{SendThrottle, ThrottleConfig};
use csgf_core::{ActionError, Amount, BetReceipt, RoundId, UserId, VenueActions};

const SUCCESS: &str = "success";

/// Configuration for `HttpVenueClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    /// Raw `Cookie` header value sent with every request.
    pub cookie: Option<String>,
    pub request_timeout: Duration,
    pub throttle: ThrottleConfig,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookie: None,
            request_timeout: Duration::from_secs(30),
            throttle: ThrottleConfig::default(),
        }
    }
}

/// `{"message": {"status": "...", "text": "..."}}`
#[derive(Debug, Deserialize)]
struct ActionReply {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    status: String,
    #[serde(default)]
    text: String,
}

/// HTTP transport for one logged-in session.
pub struct HttpVenueClient {
    base_url: String,
    http: reqwest::Client,
    throttle: SendThrottle,
    send_lock: Mutex<()>,
}

impl HttpVenueClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ActionError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ActionError::Other(format!("invalid cookie header: {e}")))?;
            headers.insert(COOKIE, value);
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ActionError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            throttle: SendThrottle::new(config.throttle),
            send_lock: Mutex::new(()),
        })
    }

    /// The underlying client, carrying the session cookie.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `fields` as multipart form data and return the response body.
    async fn post_form(&self, path: &str, fields: Vec<(&'static str, String)>) -> Result<String, ActionError> {
        let _in_flight = self.send_lock.lock().await;
        self.throttle.wait().await;

        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ActionError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(path, status, "venue request failed");
            return Err(ActionError::Http(format!("HTTP {status}: {body}")));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| ActionError::Http(e.to_string()))?;
        self.throttle.record_success().await;
        tracing::debug!(path, body = %body, "venue response");
        Ok(body)
    }
}

/// A reply that names a non-success status is a rejection. Replies without
/// a status (or that are not JSON at all) are accepted.
fn check_optional_status(body: &str) -> Result<(), ActionError> {
    match serde_json::from_str::<ActionReply>(body) {
        Ok(ActionReply {
            message: Some(message),
        }) if !message.status.is_empty() && message.status != SUCCESS => Err(ActionError::Rejected {
            status: message.status,
            text: message.text,
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl VenueActions for HttpVenueClient {
    async fn place_bet(&self, round: RoundId, amount: Amount) -> Result<BetReceipt, ActionError> {
        let body = self
            .post_form("/bet", vec![("gid", round.to_string()), ("sum", amount.to_string())])
            .await?;
        let reply: ActionReply = serde_json::from_str(&body)?;
        let message = reply.message.ok_or_else(|| ActionError::Rejected {
            status: String::new(),
            text: "bet reply without message".into(),
        })?;
        if message.status != SUCCESS {
            return Err(ActionError::Rejected {
                status: message.status,
                text: message.text,
            });
        }
        Ok(BetReceipt {
            status: message.status,
            text: message.text,
        })
    }

    async fn send_chat_message(&self, text: &str) -> Result<(), ActionError> {
        let body = self.post_form("/chat/send", vec![("message", text.to_string())]).await?;
        check_optional_status(&body)
    }

    async fn send_transfer(&self, to: UserId, amount: Amount) -> Result<(), ActionError> {
        let body = self
            .post_form("/transfer", vec![("id", to.to_string()), ("sum", amount.to_string())])
            .await?;
        check_optional_status(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_status() {
        assert!(check_optional_status("").is_ok());
        assert!(check_optional_status("<html>").is_ok());
        assert!(check_optional_status(r#"{"message":{"status":"success","text":"ok"}}"#).is_ok());
        assert!(check_optional_status(r#"{"ok":true}"#).is_ok());
        let err = check_optional_status(r#"{"message":{"status":"error","text":"Недостаточно средств"}}"#)
            .unwrap_err();
        assert!(matches!(err, ActionError::Rejected { status, .. } if status == "error"));
    }

    #[test]
    fn base_url_is_normalised() {
        let client = HttpVenueClient::new(HttpClientConfig::new("https://csgf.live/")).unwrap();
        assert_eq!(client.base_url(), "https://csgf.live");
    }

    #[test]
    fn bad_cookie_is_rejected() {
        let mut config = HttpClientConfig::new("https://csgf.live");
        config.cookie = Some("a\nb".into());
        assert!(HttpVenueClient::new(config).is_err());
    }
}
