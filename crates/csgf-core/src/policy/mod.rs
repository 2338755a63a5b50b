//! Outbound and reconnect policies.
//!
//! ```text
//! Action → [SendThrottle] → [HTTP transport]
//! Stream failure → [RetryPolicy] → reconnect
//! ```

pub mod retry;
pub mod throttle;

pub use retry::{RetryConfig, RetryPolicy};
pub use throttle::{SendThrottle, ThrottleConfig};
