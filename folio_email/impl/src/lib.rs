use anyhow::anyhow;
use folio_email_contracts::{Email, EmailBody, EmailService, SmtpReceipt};
use folio_models::email_address::EmailAddressWithName;
use lettre::{
    message::{header, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailServiceImpl {
    pub fn new(
        host: &str,
        port: u16,
        force_tls: bool,
        user: String,
        password: String,
        from: EmailAddressWithName,
    ) -> anyhow::Result<Self> {
        // `relay` wraps the connection in TLS from the first byte, while
        // `starttls_relay` upgrades a plain connection (the usual port 587
        // setup).
        let builder = if force_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        let transport = builder
            .port(port)
            .credentials(Credentials::new(user, password))
            .build();

        Ok(Self { from, transport })
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .subject(email.subject);

        if let Some(reply_to) = email.reply_to {
            builder = builder.reply_to(reply_to.0);
        }

        match email.body {
            EmailBody::Plain(text) => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(text)
                .map_err(Into::into),
            EmailBody::Alternative { plain, html } => builder
                .multipart(MultiPart::alternative_plain_html(plain, html))
                .map_err(Into::into),
        }
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<SmtpReceipt> {
        let message = self.build_message(email)?;

        let response = self.transport.send(message).await?;

        let accepted = response.is_positive();
        let queue_id = response.message().next().map(str::to_owned);
        Ok(SmtpReceipt {
            accepted,
            queue_id,
        })
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sut() -> EmailServiceImpl {
        EmailServiceImpl::new(
            "localhost",
            587,
            false,
            "user".into(),
            "password".into(),
            "Portfolio <portfolio@example.com>".parse().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn plain_message_carries_reply_to() {
        let message = sut()
            .build_message(Email {
                recipient: "Jo <jo@example.com>".parse().unwrap(),
                subject: "The Subject".into(),
                body: EmailBody::Plain("Hello World!".into()),
                reply_to: Some("reply@example.com".parse().unwrap()),
            })
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("portfolio@example.com"));
        assert!(formatted.contains("jo@example.com"));
        assert!(formatted.contains("Reply-To: reply@example.com"));
        assert!(formatted.contains("Subject: The Subject"));
        assert!(formatted.contains("Hello World!"));
    }

    #[tokio::test]
    async fn alternative_message_is_multipart() {
        let message = sut()
            .build_message(Email {
                recipient: "jo@example.com".parse().unwrap(),
                subject: "The Subject".into(),
                body: EmailBody::Alternative {
                    plain: "plain body".into(),
                    html: "<p>html body</p>".into(),
                },
                reply_to: None,
            })
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
        assert!(!formatted.contains("Reply-To"));
    }
}
