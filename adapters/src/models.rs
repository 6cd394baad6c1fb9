//! Generic data models for the `adapters` crate.
//!
//! These models define common, abstracted representations of outbound SMS
//! traffic that can be used by any gateway implementation, allowing the
//! backend services to interact with a consistent data format.

use serde::{Deserialize, Serialize};

/// A single outbound SMS, already rendered and addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundSms {
    /// Destination phone number in E.164 form.
    pub to: String,
    /// Sender id or originating number registered with the provider.
    pub from: String,
    /// Rendered message body.
    pub body: String,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsReceipt {
    /// Provider-side message identifier, used to correlate delivery reports.
    pub provider_message_id: String,
    /// Per-message cost reported by the provider, if known.
    pub cost: Option<f64>,
}
