use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use folio_core_contact_contracts::{ContactSendError, ContactService};
use folio_models::contact::ContactSubmission;

use super::{error, internal_server_error};
use crate::{
    middlewares::rate_limit::{self, RateLimiter},
    models::{
        contact::{ApiContactSubmission, ApiTransportStatus},
        ApiMessage, ApiValidationErrors,
    },
};

pub const SENT_MESSAGE: &str = "Email sent successfully! I will get back to you soon.";

/// Returned for configuration and transport failures alike, so the client
/// never learns which one it was.
pub const SEND_FAILURE_MESSAGE: &str = "Failed to send message. Please try again later.";

pub fn router(
    service: Arc<impl ContactService>,
    rate_limiter: Arc<RateLimiter>,
    expose_diagnostics: bool,
) -> Router<()> {
    let mut router = Router::new().route(
        "/contact",
        routing::post(send_message)
            .layer(from_fn_with_state(rate_limiter, rate_limit::middleware)),
    );

    if expose_diagnostics {
        router = router.route("/contact/test", routing::get(transport_status));
    }

    router.with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    Json(submission): Json<ApiContactSubmission>,
) -> Response {
    let submission = match ContactSubmission::new(submission.into()) {
        Ok(submission) => submission,
        Err(violations) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiValidationErrors {
                    success: false,
                    errors: violations.iter().map(ToString::to_string).collect(),
                }),
            )
                .into_response()
        }
    };

    match service.send_message(submission).await {
        Ok(()) => Json(ApiMessage {
            success: true,
            message: SENT_MESSAGE,
        })
        .into_response(),
        Err(err @ (ContactSendError::NotConfigured | ContactSendError::Rejected)) => {
            tracing::error!("contact message not sent: {err}");
            error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILURE_MESSAGE)
        }
        Err(ContactSendError::Unreachable(err)) => {
            tracing::error!("failed to reach smtp server: {err:#}");
            error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILURE_MESSAGE)
        }
        Err(ContactSendError::Other(err)) => internal_server_error(err),
    }
}

async fn transport_status(service: State<Arc<impl ContactService>>) -> Json<ApiTransportStatus> {
    Json(service.transport_status().into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{body::Body, http::Request, Extension};
    use folio_core_contact_contracts::{MockContactService, TransportStatus};
    use folio_models::contact::ContactDraft;
    use serde_json::json;
    use tower::Service;

    use crate::middlewares::client_ip::ClientIp;

    use super::*;

    #[tokio::test]
    async fn send_message_ok() {
        // Arrange
        let service = MockContactService::new().with_send_message(submission(), Ok(()));
        let mut app = test_app(service, 3);

        // Act
        let response = app.call(post_contact(valid_body())).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": true,
                "message": "Email sent successfully! I will get back to you soon.",
            })
        );
    }

    #[tokio::test]
    async fn invalid_submission() {
        // Arrange: the service must not be called.
        let service = MockContactService::new();
        let mut app = test_app(service, 3);

        // Act
        let response = app
            .call(post_contact(json!({
                "name": "J",
                "email": "not-an-email",
                "message": "short",
            })))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": false,
                "errors": [
                    "Name must be between 2 and 100 characters",
                    "A valid email address is required",
                    "Message must be between 10 and 5000 characters",
                ],
            })
        );
    }

    #[tokio::test]
    async fn missing_fields() {
        // Arrange
        let service = MockContactService::new();
        let mut app = test_app(service, 3);

        // Act
        let response = app.call(post_contact(json!({}))).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn send_failure_is_generic() {
        // Arrange
        let service = MockContactService::new()
            .with_send_message(submission(), Err(ContactSendError::NotConfigured));
        let mut app = test_app(service, 3);

        // Act
        let response = app.call(post_contact(valid_body())).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": false,
                "message": "Failed to send message. Please try again later.",
            })
        );
    }

    #[tokio::test]
    async fn rate_limited_after_three_requests() {
        // Arrange: the service only expects three calls.
        let service = MockContactService::new()
            .with_send_message(submission(), Ok(()))
            .with_send_message(submission(), Ok(()))
            .with_send_message(submission(), Ok(()));
        let mut app = test_app(service, 3);

        // Act + Assert
        for _ in 0..3 {
            let response = app.call(post_contact(valid_body())).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.call(post_contact(valid_body())).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["ratelimit-remaining"], "0");
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(
            json_body(response).await,
            json!({
                "success": false,
                "message": "Too many contact requests from this IP, please try again later.",
            })
        );
    }

    #[tokio::test]
    async fn rate_limit_headers_on_success() {
        // Arrange
        let service = MockContactService::new().with_send_message(submission(), Ok(()));
        let mut app = test_app(service, 3);

        // Act
        let response = app.call(post_contact(valid_body())).await.unwrap();

        // Assert
        assert_eq!(response.headers()["ratelimit-limit"], "3");
        assert_eq!(response.headers()["ratelimit-remaining"], "2");
        assert!(response.headers().contains_key("ratelimit-reset"));
    }

    #[tokio::test]
    async fn transport_status_diagnostics() {
        // Arrange
        let service = MockContactService::new().with_transport_status(TransportStatus {
            configured: true,
            host: "smtp.example.com".into(),
        });
        let mut app = test_app(service, 3);

        // Act
        let response = app
            .call(
                Request::builder()
                    .uri("/contact/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "configured": true, "host": "smtp.example.com" })
        );
    }

    #[tokio::test]
    async fn transport_status_hidden_by_default() {
        // Arrange
        let service = MockContactService::new();
        let mut app = router(
            Arc::new(service),
            Arc::new(RateLimiter::new(3, Duration::from_secs(15 * 60))),
            false,
        )
        .layer(Extension(ClientIp("203.0.113.10".parse().unwrap())));

        // Act
        let response = app
            .call(
                Request::builder()
                    .uri("/contact/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn test_app(service: MockContactService, max_requests: u32) -> Router<()> {
        router(
            Arc::new(service),
            Arc::new(RateLimiter::new(
                max_requests,
                Duration::from_secs(15 * 60),
            )),
            true,
        )
        .layer(Extension(ClientIp("203.0.113.10".parse().unwrap())))
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "name": "Jo",
            "email": "jo@example.com",
            "message": "Hello, this is a test message.",
        })
    }

    fn submission() -> ContactSubmission {
        ContactSubmission::new(ContactDraft {
            name: Some("Jo".into()),
            email: Some("jo@example.com".into()),
            message: Some("Hello, this is a test message.".into()),
        })
        .unwrap()
    }

    fn post_contact(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/contact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
