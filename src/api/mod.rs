//! API handlers for PitPulse REST endpoints

pub mod badges;
pub mod bands;
pub mod checkins;
pub mod events;
pub mod health;
pub mod openapi;
pub mod reviews;
pub mod users;
pub mod venues;

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Success envelope: `{success: true, data?, message?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope without data, for deletes and other acknowledgements
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// JSON body whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0.user_id()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_claims(parts, &state.config.auth.jwt_secret).map(AuthenticatedUser)
    }
}

/// Caller identity when a valid token is sent; anonymous otherwise
pub struct OptionalUser(pub Option<UserClaims>);

impl OptionalUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(UserClaims::user_id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(bearer_claims(parts, &state.config.auth.jwt_secret).ok()))
    }
}

fn bearer_claims(parts: &Parts, secret: &str) -> Result<UserClaims, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

    UserClaims::from_token(token, secret).map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_envelope_shapes() {
        let body = serde_json::to_value(ApiResponse::new(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": [1, 2]}));

        let body = serde_json::to_value(ApiResponse::new("x").with_message("Created")).unwrap();
        assert_eq!(body["message"], "Created");

        let body = serde_json::to_value(ApiResponse::message("Venue deleted")).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "message": "Venue deleted"}));
    }

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_claims() {
        let secret = "test-secret";
        let claims = UserClaims {
            sub: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            username: "moshpit".to_string(),
            iat: chrono::Utc::now().timestamp(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = claims.create_token(secret).unwrap();

        let parsed = bearer_claims(&parts_with(Some(&format!("Bearer {}", token))), secret).unwrap();
        assert_eq!(parsed.user_id(), claims.sub);

        assert!(matches!(bearer_claims(&parts_with(None), secret), Err(AppError::Authentication(_))));
        assert!(matches!(
            bearer_claims(&parts_with(Some(&format!("Token {}", token))), secret),
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            bearer_claims(&parts_with(Some(&format!("Bearer {}", token))), "other-secret"),
            Err(AppError::Authentication(_))
        ));
    }
}
