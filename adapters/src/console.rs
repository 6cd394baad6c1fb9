//! Console gateway implementation.
//!
//! Logs every message instead of delivering it. Used for local development
//! and in tests, where real provider traffic is unwanted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::errors::GatewayError;
use crate::models::{OutboundSms, SmsReceipt};
use crate::SmsGateway;

/// Gateway that records messages in memory and logs them.
#[derive(Default)]
pub struct ConsoleGateway {
    counter: AtomicU64,
    sent: Mutex<Vec<OutboundSms>>,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages handed to this gateway so far. Test hook.
    pub fn sent_messages(&self) -> Vec<OutboundSms> {
        self.sent.lock().expect("console gateway lock").clone()
    }
}

#[async_trait]
impl SmsGateway for ConsoleGateway {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &OutboundSms) -> Result<SmsReceipt, GatewayError> {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        info!(to = %message.to, body = %message.body, "console gateway send");
        self.sent
            .lock()
            .expect("console gateway lock")
            .push(message.clone());
        Ok(SmsReceipt {
            provider_message_id: format!("console-{seq}"),
            cost: Some(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_gateway_assigns_sequential_ids() {
        let gateway = ConsoleGateway::new();
        let message = OutboundSms {
            to: "+15550001".into(),
            from: "INNKEEPER".into(),
            body: "hello".into(),
        };
        let first = gateway.send(&message).await.expect("send");
        let second = gateway.send(&message).await.expect("send");
        assert_eq!(first.provider_message_id, "console-1");
        assert_eq!(second.provider_message_id, "console-2");
        assert_eq!(gateway.sent_messages().len(), 2);
    }
}
