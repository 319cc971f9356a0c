use folio_core_contact_contracts::TransportStatus;
use folio_models::contact::ContactDraft;
use serde::{Deserialize, Serialize};

/// Raw request body. Fields are optional so missing or null values flow
/// into sanitization as empty strings instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiContactSubmission {
    /// Full name of the sender
    #[serde(default)]
    pub name: Option<String>,
    /// Email address of the sender
    #[serde(default)]
    pub email: Option<String>,
    /// Content of the message
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ApiContactSubmission> for ContactDraft {
    fn from(value: ApiContactSubmission) -> Self {
        Self {
            name: value.name,
            email: value.email,
            message: value.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiTransportStatus {
    pub configured: bool,
    pub host: String,
}

impl From<TransportStatus> for ApiTransportStatus {
    fn from(value: TransportStatus) -> Self {
        Self {
            configured: value.configured,
            host: value.host,
        }
    }
}
