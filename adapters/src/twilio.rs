//! Twilio-specific gateway implementation.
//!
//! This file contains the complete concrete implementation of the
//! `SmsGateway` trait for a Twilio-style REST API, including the HTTP client
//! wrapper and response conversion.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::GatewayError;
use crate::models::{OutboundSms, SmsReceipt};
use crate::SmsGateway;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

/// Gateway speaking the Twilio Messages API.
pub struct TwilioGateway {
    client: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: String,
}

impl TwilioGateway {
    pub fn new(account_sid: String, auth_token: String) -> Result<Self, GatewayError> {
        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(GatewayError::Config(
                "twilio account sid and auth token are required".into(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            account_sid,
            auth_token,
        })
    }

    /// Points the gateway at a different API root. Used against mock servers.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, message: &OutboundSms) -> Result<SmsReceipt, GatewayError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let params = [
            ("To", message.to.as_str()),
            ("From", message.from.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: MessageResponse = response
                .json()
                .await
                .map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
            let cost = body.price.as_deref().and_then(|p| p.parse::<f64>().ok());
            Ok(SmsReceipt {
                provider_message_id: body.sid,
                cost: cost.map(f64::abs),
            })
        } else {
            let detail = match response.json::<ApiErrorResponse>().await {
                Ok(body) => body.message,
                Err(_) => format!("http status {status}"),
            };
            Err(GatewayError::Rejected(detail))
        }
    }
}
