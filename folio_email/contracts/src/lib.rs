use std::future::Future;

use folio_models::email_address::EmailAddressWithName;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    fn send(&self, email: Email) -> impl Future<Output = anyhow::Result<SmtpReceipt>> + Send;

    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    pub body: EmailBody,
    pub reply_to: Option<EmailAddressWithName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Plain(String),
    Alternative { plain: String, html: String },
}

/// Outcome of handing a message to the SMTP server. `queue_id` is the
/// delivery identifier from the server's response, when it provided one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReceipt {
    pub accepted: bool,
    pub queue_id: Option<String>,
}

impl SmtpReceipt {
    pub fn accepted(queue_id: impl Into<String>) -> Self {
        Self {
            accepted: true,
            queue_id: Some(queue_id.into()),
        }
    }

    pub fn rejected() -> Self {
        Self {
            accepted: false,
            queue_id: None,
        }
    }
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, receipt: SmtpReceipt) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(Ok(receipt))));
        self
    }

    pub fn with_ping(mut self, result: anyhow::Result<()>) -> Self {
        self.expect_ping()
            .once()
            .return_once(move || Box::pin(std::future::ready(result)));
        self
    }
}
