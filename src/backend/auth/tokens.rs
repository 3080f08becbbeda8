/**
 * Token Store
 *
 * Every issued JWT is recorded by `jti`. A token is accepted only if its
 * `jti` is known and not revoked, so logout and account deactivation take
 * effect immediately even though JWTs are otherwise stateless.
 */

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::sessions::{create_token, verify_token, IssuedToken, TokenType};
use crate::backend::auth::users::{get_user_by_id, User};
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::server::config::AuthConfig;

/// Record an issued token as not revoked
pub async fn record_token(
    pool: &SqlitePool,
    issued: &IssuedToken,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tokens (jti, token_type, user_id, revoked, expires) VALUES (?, ?, ?, 0, ?)",
    )
    .bind(&issued.jti)
    .bind(issued.token_type.as_str())
    .bind(user_id)
    .bind(issued.expires)
    .execute(pool)
    .await?;
    Ok(())
}

/// Sign a token for `user` and record it
pub async fn issue_token(
    pool: &SqlitePool,
    config: &AuthConfig,
    user: &User,
    token_type: TokenType,
) -> Result<IssuedToken, BackendError> {
    let issued = create_token(config, user.id, &user.username, token_type)?;
    record_token(pool, &issued, user.id).await?;
    tracing::debug!("[Auth] Issued {} token for {}", token_type, user.id);
    Ok(issued)
}

/// Whether `jti` must be rejected
///
/// Unknown tokens count as revoked.
pub async fn is_revoked(pool: &SqlitePool, jti: &str) -> Result<bool, sqlx::Error> {
    let revoked: Option<bool> = sqlx::query_scalar("SELECT revoked FROM tokens WHERE jti = ?")
        .bind(jti)
        .fetch_optional(pool)
        .await?;
    Ok(revoked.unwrap_or(true))
}

/// Revoke one token
///
/// # Returns
/// `true` if the token was known
pub async fn revoke_token(pool: &SqlitePool, jti: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE tokens SET revoked = 1 WHERE jti = ?")
        .bind(jti)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Revoke every token of a user
pub async fn revoke_all_tokens(pool: &SqlitePool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE tokens SET revoked = 1 WHERE user_id = ? AND revoked = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Revoke every token of a user except `keep_jti`
pub async fn revoke_other_tokens(
    pool: &SqlitePool,
    user_id: Uuid,
    keep_jti: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tokens SET revoked = 1 WHERE user_id = ? AND jti <> ? AND revoked = 0",
    )
    .bind(user_id)
    .bind(keep_jti)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Delete tokens whose expiry has passed
pub async fn prune_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens WHERE expires < ?")
        .bind(Utc::now().timestamp())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Resolve a bearer token to an active user
///
/// Rejects tokens that fail signature or expiry checks, tokens of the
/// wrong type, revoked or unknown tokens, and tokens of inactive or
/// missing users. All rejections are `AuthError`s.
pub async fn authenticate_token(
    pool: &SqlitePool,
    config: &AuthConfig,
    token: &str,
    expected: TokenType,
) -> Result<AuthenticatedUser, BackendError> {
    let claims = verify_token(config, token).map_err(|e| {
        tracing::debug!("[Auth] Token rejected: {}", e);
        BackendError::auth("Invalid or expired token")
    })?;

    if claims.token_type != expected {
        return Err(BackendError::auth(format!("Expected an {} token", expected)));
    }

    if is_revoked(pool, &claims.jti).await? {
        return Err(BackendError::auth("Token has been revoked"));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| BackendError::auth("Invalid or expired token"))?;

    let user = get_user_by_id(pool, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| BackendError::auth("User is inactive or does not exist"))?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        jti: claims.jti,
    })
}
