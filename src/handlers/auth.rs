//! Authentication HTTP handlers.
//!
//! - POST /api/auth/register - Create a user account
//! - POST /api/auth/login - Exchange credentials for a bearer token
//! - POST /api/auth/password/reset-request - Issue a reset token
//! - POST /api/auth/password/reset - Consume a reset token

use axum::{Json, extract::State, http::StatusCode};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{
        LoginRequest, LoginResponse, PasswordResetConfirm, PasswordResetRequest,
        PasswordResetToken, RegisterRequest, User,
    },
    security,
    state::AppState,
};

/// Register a new user.
///
/// # Response
///
/// - **201 Created** with a confirmation message
/// - **409 Conflict** when the username or email is already taken
/// - **400 Bad Request** on blank fields or a malformed email
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if !request.email.contains('@') {
        return Err(AppError::Validation("Email is invalid".to_string()));
    }
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let username_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&request.username)
            .fetch_one(&state.pool)
            .await?;
    if username_taken {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }

    let email_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&request.email)
            .fetch_one(&state.pool)
            .await?;
    if email_taken {
        return Err(AppError::Conflict("Email is already in use".to_string()));
    }

    let password_hash = security::hash_password(&request.password)?;

    sqlx::query("INSERT INTO users (username, email, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(&request.username)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(request.role)
        .execute(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User registered successfully"})),
    ))
}

/// Authenticate with username/password and issue a bearer token.
///
/// The token is returned exactly once; only its SHA-256 digest is stored,
/// together with an expiry (`TOKEN_TTL_HOURS`, default 24h).
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&request.username)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !security::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = security::generate_token();
    let expires_at = Utc::now() + Duration::hours(state.config.token_ttl_hours);

    sqlx::query("INSERT INTO auth_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user.id)
        .bind(security::token_digest(&token))
        .bind(expires_at)
        .execute(&state.pool)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

/// Request a password reset token.
///
/// Always answers 200 with a generic message so the endpoint does not
/// reveal whether an email is registered. A new request supersedes any
/// outstanding token for the same user.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<Value>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&request.email)
        .fetch_optional(&state.pool)
        .await?;

    let Some(user) = user else {
        return Ok(Json(json!({
            "message": "If your email is registered, you will receive a password reset link"
        })));
    };

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::hours(24);

    // One token per user: replace any outstanding one.
    sqlx::query(
        r#"
        INSERT INTO password_reset_tokens (user_id, token, expires_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE
        SET token = EXCLUDED.token,
            expires_at = EXCLUDED.expires_at,
            created_at = NOW()
        "#,
    )
    .bind(user.id)
    .bind(&token)
    .bind(expires_at)
    .execute(&state.pool)
    .await?;

    // A real deployment would mail the token instead of returning it.
    Ok(Json(json!({
        "message": "If your email is registered, you will receive a password reset link",
        "token": token
    })))
}

/// Reset a password with a previously issued token.
///
/// The token is single-use: it is deleted on success.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirm>,
) -> Result<Json<Value>, AppError> {
    if request.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let reset = sqlx::query_as::<_, PasswordResetToken>(
        "SELECT * FROM password_reset_tokens WHERE token = $1",
    )
    .bind(&request.token)
    .fetch_optional(&state.pool)
    .await?;

    let reset = match reset {
        Some(r) if !r.is_expired() => r,
        _ => {
            return Err(AppError::Validation(
                "Invalid or expired token".to_string(),
            ));
        }
    };

    let password_hash = security::hash_password(&request.password)?;

    let mut tx = state.pool.begin().await?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&password_hash)
        .bind(reset.user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM password_reset_tokens WHERE id = $1")
        .bind(reset.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(json!({"message": "Password has been reset successfully"})))
}
