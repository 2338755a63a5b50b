//! Extractors for the markup fragments ("blade") the venue embeds in
//! stream payloads.
//!
//! None of these parse HTML. Each one looks for a fixed literal and returns
//! the text it brackets, so a markup change on the venue side only touches
//! the extractor for the affected field. Every extractor returns `None`
//! when its pattern is absent; the decoder turns that into a
//! [`DecodeError`](crate::error::DecodeError) for the whole event.

/// Text between the first `open` and the next `close` after it.
pub fn between<'a>(fragment: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = fragment.find(open)? + open.len();
    let rest = &fragment[start..];
    let end = rest.find(close)?;
    Some(&rest[..end])
}

/// The first run of ASCII digits directly following `marker`.
///
/// Occurrences of `marker` not followed by a digit are skipped.
pub fn digits_after<'a>(fragment: &'a str, marker: &str) -> Option<&'a str> {
    fragment.match_indices(marker).find_map(|(idx, _)| {
        let rest = &fragment[idx + marker.len()..];
        let run = digit_run(rest);
        (!run.is_empty()).then_some(run)
    })
}

/// The first run of ASCII digits enclosed exactly by `open` and `close`.
pub fn digits_between<'a>(fragment: &'a str, open: &str, close: &str) -> Option<&'a str> {
    fragment.match_indices(open).find_map(|(idx, _)| {
        let rest = &fragment[idx + open.len()..];
        let run = digit_run(rest);
        (!run.is_empty() && rest[run.len()..].starts_with(close)).then_some(run)
    })
}

fn digit_run(s: &str) -> &str {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    &s[..len]
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

// ─── new_game ────────────────────────────────────────────────────────────────

/// Round id from the `game_<id>` token of a new-round card.
pub fn round_token(blade: &str) -> Option<&str> {
    digits_after(blade, "game_")
}

// ─── new_bet ─────────────────────────────────────────────────────────────────

/// User id from the bettor's profile link `<a href="/user/<id>">`.
pub fn bettor_user_id(blade: &str) -> Option<&str> {
    digits_between(blade, "<a href=\"/user/", "\">")
}

/// Stake text from `<span class="sum">12.50 <i ...>`, trimmed.
pub fn stake_sum(blade: &str) -> Option<&str> {
    between(blade, "<span class=\"sum\">", "<")
        .map(str::trim)
        .and_then(non_empty)
}

// ─── chat_new ────────────────────────────────────────────────────────────────

/// Message body from `<span class="text2">…</span>`.
pub fn chat_text(blade: &str) -> Option<&str> {
    between(blade, "<span class=\"text2\">", "</span>").and_then(non_empty)
}

/// Author id from the `data-user="<id>"` attribute.
pub fn chat_user_id(blade: &str) -> Option<&str> {
    digits_between(blade, "data-user=\"", "\"")
}

/// Author display name from the `data-text="…"` attribute.
pub fn chat_display_name(blade: &str) -> Option<&str> {
    between(blade, "data-text=\"", "\"").and_then(non_empty)
}

// ─── notify#<uid> ────────────────────────────────────────────────────────────

const TRANSFER_PREFIX: &str = "Переведено ";
const TRANSFER_SENDER: &str = "<br>от ";

/// Split a transfer notification `Переведено <amount><br>от <sender>` into
/// its amount text and sender name. Other notification shapes return `None`.
pub fn transfer_parts(text: &str) -> Option<(&str, &str)> {
    let start = text.find(TRANSFER_PREFIX)? + TRANSFER_PREFIX.len();
    let rest = &text[start..];
    let split = rest.rfind(TRANSFER_SENDER)?;
    let amount = non_empty(rest[..split].trim())?;
    let sender = rest[split + TRANSFER_SENDER.len()..]
        .lines()
        .next()
        .map(str::trim)
        .and_then(non_empty)?;
    Some((amount, sender))
}
