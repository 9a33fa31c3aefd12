//! WebSocket module for the live feed
//!
//! Provides the `/ws` endpoint. Every connection becomes a subscriber of the
//! server's [`BroadcastHub`]; new globals and stats updates are pushed as
//! `{type, data, time}` envelopes.

pub mod events;
pub mod handler;
pub mod hub;
pub mod registry;
pub mod state;

pub use events::{Envelope, LiveEvent};
pub use hub::{BroadcastHub, LiveSink, SubscriberId};
pub use registry::HubRegistry;
pub use state::AppState;
