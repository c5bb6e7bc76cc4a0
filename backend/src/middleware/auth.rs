//! Authentication middleware
//!
//! Verifies bearer tokens issued by the identity service and exposes the
//! caller's organization and seed bank role to handlers.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::Role;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match decode_jwt(token, &state.config.auth.token_secret) {
        Ok(claims) => claims,
        Err(msg) => {
            tracing::debug!("Rejected token: {}", msg);
            return unauthorized_response(&msg);
        }
    };

    let auth_user = match claims.into_auth_user() {
        Ok(user) => user,
        Err(msg) => return unauthorized_response(msg),
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    organization_id: String,
    role: String,
    exp: i64,
    iat: i64,
}

impl Claims {
    fn into_auth_user(self) -> Result<AuthUser, &'static str> {
        let user_id = Uuid::parse_str(&self.sub).map_err(|_| "Invalid user ID in token")?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|_| "Invalid organization ID in token")?;
        let role = Role::parse(&self.role).ok_or("Unknown role in token")?;
        Ok(AuthUser {
            user_id,
            organization_id,
            role,
        })
    }
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
