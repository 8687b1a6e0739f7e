//! Email transport — attachment fallback to the operations mailbox.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::config::EmailFallbackConfig;
use crate::ports::delivery::{DocumentTransport, OutboundDocument};

/// SMTP transport sending documents as attachments.
pub struct EmailTransport {
    config: EmailFallbackConfig,
}

impl EmailTransport {
    pub fn new(config: EmailFallbackConfig) -> Self {
        Self { config }
    }

    fn content_type_for(file_name: &str) -> ContentType {
        let mime = if file_name.ends_with(".csv") {
            "text/csv"
        } else if file_name.ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        };
        ContentType::parse(mime).expect("static MIME types parse")
    }
}

#[async_trait]
impl DocumentTransport for EmailTransport {
    fn name(&self) -> &'static str {
        "email"
    }

    #[instrument(skip(self, documents), fields(files = documents.len()))]
    async fn deliver(
        &self,
        booking_reference: &str,
        documents: &[OutboundDocument],
    ) -> Result<String> {
        let body_text = format!(
            "Shipping documents for booking {booking_reference}.\n\
             Secure file transfer was unavailable; attached for manual handling."
        );

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(body_text));
        for document in documents {
            multipart = multipart.singlepart(
                Attachment::new(document.file_name.clone())
                    .body(document.bytes.clone(), Self::content_type_for(&document.file_name)),
            );
        }

        let message = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .context("Invalid from_address")?,
            )
            .to(self
                .config
                .ops_mailbox
                .parse()
                .context("Invalid ops_mailbox address")?)
            .subject(format!("Shipping documents — booking {booking_reference}"))
            .multipart(multipart)
            .context("Failed to build email")?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .context("Invalid SMTP relay host")?
            .port(self.config.smtp_port);
        if let Some(password) = &self.config.password {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                password.clone(),
            ));
        }
        let mailer = builder.build();

        mailer
            .send(message)
            .await
            .context("SMTP send was rejected")?;

        info!(mailbox = %self.config.ops_mailbox, "Documents emailed to operations");
        Ok(self.config.ops_mailbox.clone())
    }
}
