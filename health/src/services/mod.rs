pub mod health;
pub use health::HealthService;

use axum::{
    response::IntoResponse,
    http::StatusCode,
    Json
};
use crate::api::models::ApiResponse;
use tracing::error;

pub struct AppError(pub common::Error);

impl AppError {
    pub fn bad_request(message: String) -> Self {
        AppError(common::Error::InvalidInput(message))
    }

    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            common::Error::Forbidden => StatusCode::FORBIDDEN,
            common::Error::DegenerateInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            common::Error::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            common::Error::UpstreamExhausted { .. }
            | common::Error::TransientUpstream { .. }
            | common::Error::FatalUpstream { .. }
            | common::Error::Http(_) => StatusCode::BAD_GATEWAY,
            common::Error::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!(status = status_code.as_u16(), error = %self.0, "Request failed");
        }

        let body = Json(ApiResponse::<()>::error(self.0.to_string()));
        (status_code, body).into_response()
    }
}

impl From<common::Error> for AppError {
    fn from(err: common::Error) -> Self {
        AppError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Error;

    fn status(err: Error) -> StatusCode {
        AppError::from(err).status_code()
    }

    #[test]
    fn test_transport_mapping() {
        assert_eq!(status(Error::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(Error::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status(Error::DegenerateInput("empty".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status(Error::RateLimit), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(Error::GatewayTimeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status(Error::from_status(404, "gone")), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status(Error::UpstreamExhausted {
                attempts: 3,
                last: Box::new(Error::from_status(503, "down")),
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(Error::SchemaMismatch("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = AppError(Error::RateLimit).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "data": null,
                "error": "Rate limit exceeded"
            })
        );
    }
}
