use serde::Serialize;

pub mod contact;

/// Envelope shared by the success confirmation and every failure response.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiValidationErrors {
    pub success: bool,
    pub errors: Vec<String>,
}
