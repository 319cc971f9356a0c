use std::future::Future;

use folio_models::contact::ContactSubmission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactService: Send + Sync + 'static {
    /// Relays a validated submission: notifies the owner first, then sends
    /// the submitter an acknowledgement.
    fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<(), ContactSendError>> + Send;

    /// Reports the transport configuration without touching the network.
    fn transport_status(&self) -> TransportStatus;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStatus {
    pub configured: bool,
    pub host: String,
}

#[derive(Debug, Error)]
pub enum ContactSendError {
    /// Smtp credentials are missing. An operator problem, not a user one.
    #[error("Smtp credentials are not configured.")]
    NotConfigured,
    #[error("Failed to reach the smtp server.")]
    Unreachable(#[source] anyhow::Error),
    #[error("The smtp server did not accept the message.")]
    Rejected,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactService {
    pub fn with_send_message(
        mut self,
        submission: ContactSubmission,
        result: Result<(), ContactSendError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_transport_status(mut self, status: TransportStatus) -> Self {
        self.expect_transport_status()
            .once()
            .return_once(move || status);
        self
    }
}
