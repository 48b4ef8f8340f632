//! Dispatch server: tower invocation pipeline, batch runner, and axum
//! transport in front of a chat-platform API.

pub mod config;
pub mod network;
pub mod service;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use network::NetworkModule;
pub use service::{ChatPlatform, Dispatcher, DryRunPlatform};
