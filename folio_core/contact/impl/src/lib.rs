use std::sync::Arc;

use folio_core_contact_contracts::{ContactSendError, ContactService, TransportStatus};
use folio_email_contracts::{Email, EmailBody, EmailService, SmtpReceipt};
use folio_models::{contact::ContactSubmission, email_address::EmailAddressWithName};
use folio_templates_contracts::{
    AcknowledgementTemplate, OwnerNotificationTemplate, TemplateService,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email, Template> {
    email: Option<Email>,
    template: Template,
    config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// Mailbox that receives a notification for every submission.
    pub owner: Arc<EmailAddressWithName>,
    pub smtp_host: Arc<str>,
}

impl<Email, Template> ContactServiceImpl<Email, Template> {
    pub fn new(email: Option<Email>, template: Template, config: ContactServiceConfig) -> Self {
        Self {
            email,
            template,
            config,
        }
    }
}

impl<EmailS, TemplateS> ContactService for ContactServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn send_message(&self, submission: ContactSubmission) -> Result<(), ContactSendError> {
        let Some(email) = &self.email else {
            return Err(ContactSendError::NotConfigured);
        };

        email.ping().await.map_err(ContactSendError::Unreachable)?;

        let submitter = submission
            .email
            .clone()
            .with_name((*submission.name).clone());

        let notification = Email {
            recipient: (*self.config.owner).clone(),
            subject: format!("[Contact Form] New message from {}", *submission.name),
            body: EmailBody::Alternative {
                plain: format!(
                    "Message from {} ({}):\n\n{}",
                    *submission.name,
                    submission.email.as_str(),
                    *submission.message
                ),
                html: self.template.render(&OwnerNotificationTemplate {
                    name: (*submission.name).clone(),
                    email: submission.email.as_str().to_owned(),
                    message: (*submission.message).clone(),
                })?,
            },
            reply_to: Some(submitter.clone()),
        };
        self.dispatch(email, notification).await?;

        let acknowledgement = Email {
            recipient: submitter,
            subject: "Thanks for your message!".into(),
            body: EmailBody::Alternative {
                plain: format!(
                    "Hi {},\n\nyour message has arrived safely. I will get back to you as soon \
                     as I can.",
                    *submission.name
                ),
                html: self.template.render(&AcknowledgementTemplate {
                    name: (*submission.name).clone(),
                })?,
            },
            reply_to: None,
        };
        self.dispatch(email, acknowledgement).await?;

        Ok(())
    }

    fn transport_status(&self) -> TransportStatus {
        TransportStatus {
            configured: self.email.is_some(),
            host: self.config.smtp_host.to_string(),
        }
    }
}

impl<EmailS, TemplateS> ContactServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn dispatch(&self, email: &EmailS, message: Email) -> Result<(), ContactSendError> {
        let SmtpReceipt { accepted, queue_id } = email.send(message).await?;

        if !accepted {
            return Err(ContactSendError::Rejected);
        }

        debug!(
            queue_id = queue_id.as_deref().unwrap_or("-"),
            "message accepted by smtp server"
        );

        Ok(())
    }
}
