//! Client for the M-Pesa Daraja mobile-money gateway.
//!
//! Builds the gateway's request bodies, authenticates with a freshly issued
//! bearer token and returns the gateway's synchronous acknowledgment. Final
//! transaction outcomes are delivered later to the caller's callback URLs.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod mask;
pub mod models;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Daraja;
pub use config::{ClientConfig, ConfigLayer, load_config_from_path, load_config_layer_from_path};
pub use credentials::{derive_password, encrypt_initiator_secret, timestamp, timestamp_now};
pub use environment::{Endpoint, Environment};
pub use error::{DarajaError, Result};
pub use models::GatewayResponse;
