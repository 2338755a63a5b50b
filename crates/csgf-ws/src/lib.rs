//! csgf-ws: the venue's real-time stream.
//!
//! # Features
//! - Token handshake and channel subscription
//! - Multi-reply text frames split and decoded one reply at a time
//! - Explicit dispatch table from decoded events to observers
//! - Auto-reconnect with bounded exponential backoff

pub mod client;
pub mod dispatch;
pub mod frame;
pub mod subscriptions;

pub use client::{StreamClient, StreamConfig, StreamError};
pub use dispatch::{route, Dispatcher, Route};
pub use subscriptions::{RequestIds, SubscriptionPlan};
