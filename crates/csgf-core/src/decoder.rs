//! `PayloadDecoder`: one channel payload in, one [`DecodedEvent`] out.
//!
//! The venue wraps every payload as `{"data": {...}}` inside the frame's
//! `result.data`; the decoder receives that outer object. Several values of
//! interest only exist inside the `blade` markup fragment and are recovered
//! through [`markup`](crate::markup). Any missing or malformed sub-field
//! fails the whole event; nothing is partially populated.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::event::{channels, ChatMessage, DecodedEvent, TransferNotice};
use crate::markup;
use crate::room::RoomKind;
use crate::types::{Amount, RoundId, UserId};

type Fields = Map<String, Value>;

/// Stateless decoder bound to the local session's user id, which names the
/// per-session channels.
#[derive(Debug, Clone)]
pub struct PayloadDecoder {
    notify_channel: String,
    balance_channel: String,
}

impl PayloadDecoder {
    pub fn new(own_user: UserId) -> Self {
        Self {
            notify_channel: channels::notify(own_user),
            balance_channel: channels::balance(own_user),
        }
    }

    /// Decode the payload received on `channel`.
    ///
    /// Channels csgfkit does not act on yield [`DecodedEvent::Unrecognized`].
    pub fn decode(&self, channel: &str, data: &Fields) -> Result<DecodedEvent, DecodeError> {
        match channel {
            channels::NEW_GAME => decode_new_round(body(data)?),
            channels::END_GAME => decode_round_ended(body(data)?),
            channels::NEW_BET => decode_stake(body(data)?),
            channels::TIME_GAME => decode_time_tick(body(data)?),
            channels::CHAT_NEW => decode_chat(body(data)?),
            c if c == self.notify_channel => decode_notify(body(data)?),
            c if c == self.balance_channel => decode_balance(body(data)?),
            _ => Ok(DecodedEvent::Unrecognized),
        }
    }
}

// ─── Per-channel rules ───────────────────────────────────────────────────────

fn decode_new_round(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    let room_id = int_field(data, "room", "data.room")?;
    let room = RoomKind::from_id(room_id).ok_or(DecodeError::UnknownRoom { room: room_id })?;
    let blade = str_field(data, "blade", "data.blade")?;
    let id = markup::round_token(blade).ok_or(DecodeError::MissingField {
        field: "blade.round_id",
    })?;
    Ok(DecodedEvent::NewRound {
        id: RoundId(parse_int(id, "blade.round_id")?),
        room,
    })
}

fn decode_round_ended(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    Ok(DecodedEvent::RoundEnded {
        id: RoundId(int_field(data, "game", "data.game")?),
    })
}

fn decode_stake(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    let bank = amount_field(data, "bank", "data.bank")?;
    let id = RoundId(int_field(data, "game", "data.game")?);
    let blade = str_field(data, "blade", "data.blade")?;

    let user = markup::bettor_user_id(blade).ok_or(DecodeError::MissingField {
        field: "blade.user_id",
    })?;
    let stake = markup::stake_sum(blade).ok_or(DecodeError::MissingField {
        field: "blade.stake",
    })?;

    Ok(DecodedEvent::StakePlaced {
        id,
        bank,
        user: UserId(parse_int(user, "blade.user_id")?),
        stake: parse_amount(stake, "blade.stake")?,
    })
}

fn decode_time_tick(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    let id = RoundId(int_field(data, "game", "data.game")?);
    let room = int_field(data, "room", "data.room")?;
    let time = int_field(data, "time", "data.time")?;
    let seconds = u32::try_from(time).map_err(|_| DecodeError::MalformedField {
        field: "data.time",
        value: time.to_string(),
    })?;
    Ok(DecodedEvent::TimeTick { id, room, seconds })
}

fn decode_chat(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    let blade = str_field(data, "blade", "data.blade")?;

    let text = markup::chat_text(blade).ok_or(DecodeError::MissingField { field: "blade.text" })?;
    let user = markup::chat_user_id(blade).ok_or(DecodeError::MissingField {
        field: "blade.user_id",
    })?;
    let display_name = markup::chat_display_name(blade).ok_or(DecodeError::MissingField {
        field: "blade.display_name",
    })?;

    Ok(DecodedEvent::ChatMessage(ChatMessage {
        text: text.to_string(),
        user: UserId(parse_int(user, "blade.user_id")?),
        display_name: display_name.to_string(),
    }))
}

fn decode_notify(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    let message = data
        .get("message")
        .ok_or(DecodeError::MissingField { field: "data.message" })?
        .as_object()
        .ok_or_else(|| malformed("data.message", data.get("message")))?;
    let text = str_field(message, "text", "data.message.text")?;

    let Some((amount, sender)) = markup::transfer_parts(text) else {
        return Ok(DecodedEvent::Unrecognized);
    };
    Ok(DecodedEvent::TransferNotice(TransferNotice {
        amount: parse_amount(amount, "notify.amount")?,
        from_display_name: sender.to_string(),
    }))
}

fn decode_balance(data: &Fields) -> Result<DecodedEvent, DecodeError> {
    Ok(DecodedEvent::BalanceUpdate {
        balance: amount_field(data, "balance", "data.balance")?,
    })
}

// ─── Field readers ───────────────────────────────────────────────────────────

/// The nested `data` object every channel payload carries.
fn body(data: &Fields) -> Result<&Fields, DecodeError> {
    let inner = data
        .get("data")
        .ok_or(DecodeError::MissingField { field: "data" })?;
    inner.as_object().ok_or_else(|| malformed("data", Some(inner)))
}

fn str_field<'a>(
    obj: &'a Fields,
    key: &str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField { field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        other => Err(malformed(field, other)),
    }
}

/// A non-negative integer sent either as a JSON number or a digit string.
fn int_field(obj: &Fields, key: &str, field: &'static str) -> Result<u64, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField { field }),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| malformed(field, obj.get(key))),
        Some(Value::String(s)) => parse_int(s, field),
        other => Err(malformed(field, other)),
    }
}

/// A money amount sent either as a JSON number or a decimal string.
fn amount_field(obj: &Fields, key: &str, field: &'static str) -> Result<Amount, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField { field }),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| *v >= 0.0)
            .and_then(Amount::from_f64_rounded)
            .ok_or_else(|| malformed(field, obj.get(key))),
        Some(Value::String(s)) => parse_amount(s, field),
        other => Err(malformed(field, other)),
    }
}

fn parse_int(s: &str, field: &'static str) -> Result<u64, DecodeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::MalformedField {
            field,
            value: s.to_string(),
        });
    }
    s.parse().map_err(|_| DecodeError::MalformedField {
        field,
        value: s.to_string(),
    })
}

fn parse_amount(s: &str, field: &'static str) -> Result<Amount, DecodeError> {
    s.parse().map_err(|_| DecodeError::MalformedField {
        field,
        value: s.to_string(),
    })
}

fn malformed(field: &'static str, value: Option<&Value>) -> DecodeError {
    DecodeError::MalformedField {
        field,
        value: value.map(Value::to_string).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OWN: UserId = UserId(555);

    fn decode(channel: &str, payload: Value) -> Result<DecodedEvent, DecodeError> {
        let Value::Object(map) = payload else {
            panic!("payload must be an object")
        };
        PayloadDecoder::new(OWN).decode(channel, &map)
    }

    #[test]
    fn new_round() {
        let ev = decode(
            "new_game",
            json!({"data": {"room": "4", "blade": "<div id=\"game_812\"></div>"}}),
        )
        .unwrap();
        assert_eq!(ev, DecodedEvent::NewRound { id: RoundId(812), room: RoomKind::Rich });
    }

    #[test]
    fn new_round_unknown_room_fails_closed() {
        let err = decode(
            "new_game",
            json!({"data": {"room": "9", "blade": "game_1"}}),
        )
        .unwrap_err();
        assert_eq!(err, DecodeError::UnknownRoom { room: 9 });
    }

    #[test]
    fn new_round_missing_token() {
        let err = decode("new_game", json!({"data": {"room": "1", "blade": "<div>"}})).unwrap_err();
        assert_eq!(err.field(), "blade.round_id");
    }

    #[test]
    fn stake_missing_each_sub_field() {
        let full = r#"<a href="/user/9">x</a><span class="sum">3.00 <i></i></span>"#;
        let cases = [
            (json!({"data": {"game": "1", "blade": full}}), "data.bank"),
            (json!({"data": {"bank": "10.00", "blade": full}}), "data.game"),
            (json!({"data": {"bank": "10.00", "game": "1"}}), "data.blade"),
            (
                json!({"data": {"bank": "10.00", "game": "1", "blade": "<span class=\"sum\">3 <"}}),
                "blade.user_id",
            ),
            (
                json!({"data": {"bank": "10.00", "game": "1", "blade": "<a href=\"/user/9\">"}}),
                "blade.stake",
            ),
        ];
        for (payload, field) in cases {
            let err = decode("new_bet", payload).unwrap_err();
            assert_eq!(err.field(), field);
        }
    }

    #[test]
    fn stake_bank_is_never_coerced() {
        let err = decode(
            "new_bet",
            json!({"data": {"bank": "10,50", "game": "1", "blade": ""}}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedField { field: "data.bank", value: "10,50".into() }
        );
    }

    #[test]
    fn time_tick_numeric_fields() {
        let ev = decode("time_game", json!({"data": {"game": 77, "room": 1, "time": 12}})).unwrap();
        assert_eq!(ev, DecodedEvent::TimeTick { id: RoundId(77), room: 1, seconds: 12 });

        let err = decode("time_game", json!({"data": {"game": 77, "room": 1}})).unwrap_err();
        assert_eq!(err, DecodeError::MissingField { field: "data.time" });

        let err = decode("time_game", json!({"data": {"game": -1, "room": 1, "time": 3}})).unwrap_err();
        assert_eq!(err.field(), "data.game");
    }

    #[test]
    fn notify_other_shapes_are_unrecognized() {
        let ev = decode(
            "notify#555",
            json!({"data": {"message": {"text": "Вы выиграли 10.00"}}}),
        )
        .unwrap();
        assert_eq!(ev, DecodedEvent::Unrecognized);
    }

    #[test]
    fn notify_for_another_user_is_not_ours() {
        let ev = decode(
            "notify#1",
            json!({"data": {"message": {"text": "Переведено 10<br>от Bob"}}}),
        )
        .unwrap();
        assert_eq!(ev, DecodedEvent::Unrecognized);
    }

    #[test]
    fn notify_transfer_with_bad_amount_fails() {
        let err = decode(
            "notify#555",
            json!({"data": {"message": {"text": "Переведено много<br>от Bob"}}}),
        )
        .unwrap_err();
        assert_eq!(err.field(), "notify.amount");
    }

    #[test]
    fn balance_update_accepts_number() {
        let ev = decode("balance#555", json!({"data": {"balance": 12.34}})).unwrap();
        assert_eq!(ev, DecodedEvent::BalanceUpdate { balance: Amount::from_cents(1_234) });
    }

    #[test]
    fn unknown_channel_is_unrecognized_even_without_body() {
        assert_eq!(decode("stats", json!({})).unwrap(), DecodedEvent::Unrecognized);
    }

    #[test]
    fn missing_body() {
        let err = decode("end_game", json!({"game": "1"})).unwrap_err();
        assert_eq!(err, DecodeError::MissingField { field: "data" });
    }
}
