//! Bearer-token authentication middleware.
//!
//! Every protected request goes through here:
//! 1. Extract the token from the `Authorization: Bearer <token>` header
//! 2. Hash it and look the digest up among unexpired sessions
//! 3. Inject an `AuthContext` for handlers to extract
//! 4. Reject anything else with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, models::user::Role, security, state::AppState};

/// Authenticated user identity, attached to the request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Every ownership filter in the system keys on this id.
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, sqlx::FromRow)]
struct SessionUser {
    id: Uuid,
    username: String,
    email: String,
    role: Role,
}

/// Authentication middleware function.
///
/// Tokens are opaque: the client's token is hashed with SHA-256 and the
/// digest matched against stored, unexpired sessions. No token material
/// is ever compared or stored in plaintext.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let digest = security::token_digest(token);

    let user = sqlx::query_as::<_, SessionUser>(
        r#"
        SELECT u.id, u.username, u.email, u.role
        FROM auth_tokens s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(&digest)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthContext {
        user_id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}
