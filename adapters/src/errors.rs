//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to an SMS
//! provider, giving the backend a unified error surface for every gateway
//! implementation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway is misconfigured (missing credentials, bad sender id).
    #[error("gateway configuration error: {0}")]
    Config(String),

    /// Transport-level failure reaching the provider API.
    #[error("provider transport error: {0}")]
    Transport(String),

    /// The provider accepted the request but rejected the message.
    #[error("message rejected by provider: {0}")]
    Rejected(String),

    /// The provider response could not be understood.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}
