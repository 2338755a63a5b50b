//! Golden fixture integration tests.
//!
//! Each case in `fixtures/channels.json` is one channel payload as the venue
//! sends it, plus the event it must decode to. `fixtures/malformed.json`
//! holds payloads that must fail, with the field the failure names.

use csgf_core::{Amount, DecodedEvent, PayloadDecoder, RoomKind, RoundId, UserId};
use serde_json::Value;

const OWN: UserId = UserId(555);

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn load_fixture(name: &str) -> Vec<Value> {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    let raw = std::fs::read_to_string(&p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()));
    serde_json::from_str::<Value>(&raw)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

fn decode_case(case: &Value) -> Result<DecodedEvent, csgf_core::DecodeError> {
    let channel = case["channel"].as_str().unwrap();
    let data = case["data"].as_object().unwrap();
    PayloadDecoder::new(OWN).decode(channel, data)
}

fn amount(v: &Value) -> Amount {
    v.as_str().unwrap().parse().unwrap()
}

fn id(v: &Value) -> u64 {
    v.as_u64().unwrap()
}

// ─── Well-formed payloads ─────────────────────────────────────────────────────

#[test]
fn golden_channels() {
    let cases = load_fixture("channels.json");
    assert!(!cases.is_empty());

    for case in &cases {
        let name = case["name"].as_str().unwrap();
        let expect = &case["expect"];
        let event = decode_case(case).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(event.kind(), expect["kind"].as_str().unwrap(), "{name}");

        match event {
            DecodedEvent::NewRound { id: round, room } => {
                assert_eq!(round, RoundId(id(&expect["round"])), "{name}");
                assert_eq!(Some(room), RoomKind::from_id(id(&expect["room"])), "{name}");
            }
            DecodedEvent::StakePlaced { id: round, bank, user, stake } => {
                assert_eq!(round, RoundId(id(&expect["round"])), "{name}");
                assert_eq!(bank, amount(&expect["bank"]), "{name}");
                assert_eq!(user, UserId(id(&expect["user"])), "{name}");
                assert_eq!(stake, amount(&expect["stake"]), "{name}");
            }
            DecodedEvent::TimeTick { id: round, room, seconds } => {
                assert_eq!(round, RoundId(id(&expect["round"])), "{name}");
                assert_eq!(room, id(&expect["room"]), "{name}");
                assert_eq!(u64::from(seconds), id(&expect["seconds"]), "{name}");
            }
            DecodedEvent::RoundEnded { id: round } => {
                assert_eq!(round, RoundId(id(&expect["round"])), "{name}");
            }
            DecodedEvent::ChatMessage(msg) => {
                assert_eq!(msg.text, expect["text"].as_str().unwrap(), "{name}");
                assert_eq!(msg.user, UserId(id(&expect["user"])), "{name}");
                assert_eq!(msg.display_name, expect["display_name"].as_str().unwrap(), "{name}");
            }
            DecodedEvent::TransferNotice(notice) => {
                assert_eq!(notice.amount, amount(&expect["amount"]), "{name}");
                assert_eq!(notice.from_display_name, expect["from"].as_str().unwrap(), "{name}");
            }
            DecodedEvent::BalanceUpdate { balance } => {
                assert_eq!(balance, amount(&expect["balance"]), "{name}");
            }
            DecodedEvent::Unrecognized => {}
        }
    }
}

// ─── Malformed payloads ───────────────────────────────────────────────────────

#[test]
fn golden_malformed() {
    for case in &load_fixture("malformed.json") {
        let expected = case["field"].as_str().unwrap();
        match decode_case(case) {
            Err(e) => assert_eq!(e.field(), expected, "{case}"),
            Ok(ev) => panic!("expected failure on {expected}, decoded {ev:?}"),
        }
    }
}
