//! Core `adapters` crate for abstracting SMS provider interactions.
//!
//! This crate defines the `SmsGateway` trait, which outlines the generic
//! send operation every provider must support, and provides the concrete
//! implementations (Twilio-style HTTP API, console) used by the backend.

pub mod console;
pub mod errors;
pub mod models;
pub mod twilio;

use async_trait::async_trait;

pub use console::ConsoleGateway;
pub use errors::GatewayError;
pub use models::{OutboundSms, SmsReceipt};
pub use twilio::TwilioGateway;

/// A provider capable of delivering a rendered SMS.
///
/// Implementations must be cheap to share behind an `Arc` and safe to call
/// concurrently from the dispatcher.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Short provider name used in logs and usage records.
    fn name(&self) -> &str;

    /// Hands one message to the provider and returns its receipt.
    async fn send(&self, message: &OutboundSms) -> Result<SmsReceipt, GatewayError>;
}
