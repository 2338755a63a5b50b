//! The fixed channel set a session subscribes to, and request ids.

use std::sync::atomic::{AtomicU64, Ordering};

use csgf_core::event::channels;
use csgf_core::UserId;

use crate::frame::SubscribeRequest;

/// Request ids for one connection, starting at 1. The connect request takes
/// the first id.
#[derive(Debug)]
pub struct RequestIds(AtomicU64);

impl RequestIds {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Channels to subscribe to, in subscription order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPlan {
    channels: Vec<String>,
}

impl SubscriptionPlan {
    /// The standard plan for a session: the public channels plus the
    /// per-user balance and notification channels.
    pub fn for_user(user: UserId) -> Self {
        Self {
            channels: vec![
                channels::TEST.to_string(),
                channels::NEW_BET.to_string(),
                channels::NEW_GAME.to_string(),
                channels::TIME_GAME.to_string(),
                channels::END_GAME.to_string(),
                channels::STATS.to_string(),
                channels::balance(user),
                channels::CHAT_NEW.to_string(),
                channels::notify(user),
            ],
        }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// One subscribe request per channel, ids drawn from `ids`.
    pub fn requests(&self, ids: &RequestIds) -> Vec<SubscribeRequest> {
        self.channels
            .iter()
            .map(|channel| SubscribeRequest::new(channel.as_str(), ids.next_id()))
            .collect()
    }

    /// All subscribe requests as one newline-separated text frame.
    pub fn encode_batch(&self, ids: &RequestIds) -> Result<String, serde_json::Error> {
        let lines = self
            .requests(ids)
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_order_and_ids() {
        let ids = RequestIds::new();
        assert_eq!(ids.next_id(), 1);

        let plan = SubscriptionPlan::for_user(UserId(77));
        let reqs = plan.requests(&ids);
        let channels: Vec<_> = reqs.iter().map(|r| r.params.channel.as_str()).collect();
        assert_eq!(
            channels,
            [
                "test", "new_bet", "new_game", "time_game", "end_game", "stats", "balance#77",
                "chat_new", "notify#77"
            ]
        );
        let numbers: Vec<_> = reqs.iter().map(|r| r.id).collect();
        assert_eq!(numbers, (2..=10).collect::<Vec<_>>());
        assert!(reqs.iter().all(|r| r.method == 1));
    }

    #[test]
    fn batch_is_one_request_per_line() {
        let ids = RequestIds::new();
        ids.next_id();
        let batch = SubscriptionPlan::for_user(UserId(1)).encode_batch(&ids).unwrap();
        let lines: Vec<_> = batch.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], r#"{"method":1,"params":{"channel":"test"},"id":2}"#);
        assert_eq!(lines[8], r#"{"method":1,"params":{"channel":"notify#1"},"id":10}"#);
    }
}
