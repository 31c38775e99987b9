use async_trait::async_trait;
use uuid::Uuid;

use super::{mask_recipient, NotificationSink, OutgoingMessage, SendResult};

/// Demo provider: writes each message to the log stream instead of sending it
#[derive(Debug, Default, Clone)]
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    fn provider(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &OutgoingMessage) -> SendResult {
        let message_id = format!("console-{}", Uuid::new_v4());
        tracing::info!(
            target: "visa_crm::outbox",
            channel = %message.channel,
            to = %mask_recipient(&message.recipient),
            subject = message.subject.as_deref().unwrap_or(""),
            message_id = %message_id,
            "{}",
            message.body
        );
        SendResult::sent(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message_template::Channel;

    #[tokio::test]
    async fn test_console_sink_always_succeeds() {
        let sink = ConsoleSink;
        let result = sink
            .send(&OutgoingMessage {
                channel: Channel::Whatsapp,
                recipient: "+2348012345678".to_string(),
                subject: None,
                body: "hello".to_string(),
            })
            .await;
        assert!(result.success);
        assert!(result
            .provider_message_id
            .as_deref()
            .is_some_and(|id| id.starts_with("console-")));
    }
}
