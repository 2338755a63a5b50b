//! Session bootstrap from the venue's home page.
//!
//! A logged-in home page embeds the stream token as `TOKEN = "…"`, the
//! balance as `<span class="balance">…</span>` and the profile link as
//! `<a href="/user/<id>" class="avatar" …>`.

use thiserror::Error;

use csgf_core::markup;
use csgf_core::{Amount, Session, UserId};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP error: {0}")]
    Http(String),

    /// No token on the page; usually the cookie is missing or expired.
    #[error("Stream token not found on home page")]
    MissingToken,

    #[error("Balance not found on home page")]
    MissingBalance,

    #[error("Malformed balance: {0:?}")]
    MalformedBalance(String),

    #[error("User id not found on home page")]
    MissingUserId,

    #[error("Malformed user id: {0:?}")]
    MalformedUserId(String),
}

/// Extract the session from home-page HTML.
pub fn parse_home_page(html: &str) -> Result<Session, SessionError> {
    let token = markup::between(html, "TOKEN = \"", "\"")
        .filter(|t| !t.is_empty())
        .ok_or(SessionError::MissingToken)?;

    let balance = markup::between(html, "<span class=\"balance\">", "</span>")
        .ok_or(SessionError::MissingBalance)?
        .trim();
    let balance: Amount = balance
        .parse()
        .map_err(|_| SessionError::MalformedBalance(balance.to_string()))?;

    let user = markup::digits_between(html, "<a href=\"/user/", "\" class=\"avatar\"")
        .ok_or(SessionError::MissingUserId)?;
    let user_id = user
        .parse()
        .map(UserId)
        .map_err(|_| SessionError::MalformedUserId(user.to_string()))?;

    Ok(Session {
        token: token.to_string(),
        user_id,
        balance,
    })
}

/// GET `<base_url>/` with `http` (which must carry the session cookie) and
/// extract the session.
pub async fn fetch_session(http: &reqwest::Client, base_url: &str) -> Result<Session, SessionError> {
    let url = format!("{}/", base_url.trim_end_matches('/'));
    let resp = http
        .get(&url)
        .send()
        .await
        .map_err(|e| SessionError::Http(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(SessionError::Http(format!("HTTP {}", resp.status().as_u16())));
    }
    let html = resp
        .text()
        .await
        .map_err(|e| SessionError::Http(e.to_string()))?;
    let session = parse_home_page(&html)?;
    tracing::info!(user_id = %session.user_id, balance = %session.balance, "session bootstrapped");
    Ok(session)
}
