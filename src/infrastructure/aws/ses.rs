use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use tracing::info;

use crate::core::store::{EmailMessage, Mailer};
use crate::errors::HandlerError;

const CHARSET: &str = "UTF-8";

/// Sends plain-text mail through SES v2.
pub struct SesMailer {
    client: SesClient,
}

impl SesMailer {
    #[must_use]
    pub fn new(client: SesClient) -> Self {
        Self { client }
    }
}

fn text(data: &str) -> Result<Content, HandlerError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| HandlerError::Mail(e.to_string()))
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), HandlerError> {
        let simple = Message::builder()
            .subject(text(&message.subject)?)
            .body(Body::builder().text(text(&message.body)?).build())
            .build();

        let output = self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .content(EmailContent::builder().simple(simple).build())
            .send()
            .await
            .map_err(|e| {
                HandlerError::Mail(format!(
                    "ses send_email to {}: {}",
                    message.to,
                    aws_sdk_sesv2::error::DisplayErrorContext(&e)
                ))
            })?;

        info!(message_id = ?output.message_id(), to = %message.to, "Email sent");
        Ok(())
    }
}
