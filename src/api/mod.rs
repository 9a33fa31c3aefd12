//! API module for HTTP and WebSocket endpoints
//!
//! This module provides the read-only query API and the live feed for the
//! globals dashboard.

pub mod http;
pub mod rest;
pub mod websocket;

pub use http::{create_router, serve};
pub use websocket::{AppState, BroadcastHub, HubRegistry, LiveEvent};
