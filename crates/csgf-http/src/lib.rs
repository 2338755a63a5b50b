//! csgf-http: the venue's HTTP surface.
//!
//! - [`HttpVenueClient`]: multipart POST transport implementing
//!   [`VenueActions`](csgf_core::VenueActions), throttled and serialised
//! - [`session`]: home-page bootstrap yielding the stream token, user id
//!   and balance

pub mod client;
pub mod session;

pub use client::{HttpClientConfig, HttpVenueClient};
pub use session::{fetch_session, parse_home_page, SessionError};
