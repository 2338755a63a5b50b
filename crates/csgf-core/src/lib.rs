//! csgf-core: decoding, round tracking and outbound policy for csgfkit.
//!
//! # Overview
//!
//! csgfkit is a real-time client for the csgf.live venue. The core crate
//! holds everything that does not touch a socket:
//!
//! - [`PayloadDecoder`]: turns one channel payload into a [`DecodedEvent`]
//! - [`markup`]: the fixed-pattern extractors for embedded markup fragments
//! - [`GameRegistry`]: open rounds and derived stake figures
//! - [`ClientState`]: per-session state shared by the read loop and observers
//! - [`VenueActions`]: the async trait every outbound transport implements
//! - [`EventObserver`]: the hook set the stream client dispatches to
//! - [`policy`] module: send throttle and reconnect backoff
//! - [`config`] module: the JSON bot configuration

pub mod betting;
pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod markup;
pub mod observer;
pub mod policy;
pub mod registry;
pub mod room;
pub mod state;
pub mod transport;
pub mod types;

pub use config::{BotConfig, LogConfig, ReconnectConfig};
pub use decoder::PayloadDecoder;
pub use error::{ActionError, ConfigError, DecodeError};
pub use event::{ChatMessage, DecodedEvent, TransferNotice};
pub use observer::EventObserver;
pub use registry::{GameRegistry, Origin, Round, RoundUpdate, UpdateReason};
pub use room::{RoomKind, RoomLimits};
pub use state::{ClientState, Session};
pub use transport::{BetReceipt, VenueActions};
pub use types::{Amount, RoundId, UserId};
