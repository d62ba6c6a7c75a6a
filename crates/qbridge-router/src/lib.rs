//! HTTP surfaces: the bridging gateway and the forwarding tap.
//!
//! The gateway normalizes Gemini-style chat requests and relays them to a
//! configured OpenAI-compatible downstream. The tap is an unrelated
//! observability wrapper that blindly relays traffic to a fixed upstream.

mod client;
pub mod gateway;
pub mod tap;

pub use client::{ClientConfig, build_client};
pub use gateway::{GatewayState, gateway_router};
pub use tap::{TapState, tap_router};
