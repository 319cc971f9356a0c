use nutype::nutype;
use thiserror::Error;

use crate::email_address::EmailAddress;

/// Upper bound applied by [`sanitize`] before validation ever sees the value.
pub const SANITIZE_MAX_CHARS: usize = 1000;

/// A contact form submission that has passed sanitization and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: SubmitterName,
    pub email: EmailAddress,
    pub message: MessageBody,
}

/// Raw, untrusted contact form fields as they arrived on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct SubmitterName(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 5000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref)
)]
pub struct MessageBody(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactViolation {
    #[error("Name must be between 2 and 100 characters")]
    NameLength,
    #[error("A valid email address is required")]
    EmailInvalid,
    #[error("Message must be between 10 and 5000 characters")]
    MessageLength,
}

impl ContactSubmission {
    /// Sanitizes each field and checks all validation rules independently.
    ///
    /// Violations are collected in field order rather than short-circuiting
    /// at the first failure, so the caller can report every problem at once.
    pub fn new(draft: ContactDraft) -> Result<Self, Vec<ContactViolation>> {
        let name = SubmitterName::try_new(sanitize(draft.name.as_deref()))
            .map_err(|_| ContactViolation::NameLength);
        let email = sanitize(draft.email.as_deref())
            .parse::<EmailAddress>()
            .map_err(|_| ContactViolation::EmailInvalid);
        let message = MessageBody::try_new(sanitize(draft.message.as_deref()))
            .map_err(|_| ContactViolation::MessageLength);

        match (name, email, message) {
            (Ok(name), Ok(email), Ok(message)) => Ok(Self {
                name,
                email,
                message,
            }),
            (name, email, message) => Err([name.err(), email.err(), message.err()]
                .into_iter()
                .flatten()
                .collect()),
        }
    }
}

/// Normalizes a raw form field: angle brackets are stripped, the value is
/// capped at [`SANITIZE_MAX_CHARS`] and surrounding whitespace is removed.
/// Absent fields become the empty string. The strip -> cap -> trim order
/// keeps the function idempotent.
pub fn sanitize(input: Option<&str>) -> String {
    let Some(input) = input else {
        return String::new();
    };

    let stripped = input
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(SANITIZE_MAX_CHARS)
        .collect::<String>();

    stripped.trim().to_owned()
}
