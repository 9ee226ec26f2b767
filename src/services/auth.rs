use std::sync::LazyLock;

use crate::crypto::token;
use crate::error::{AppError, Result};
use crate::models::session::{AuthState, Session};
use crate::models::user::User;
use crate::state::AppState;
use crate::validation::auth::normalize_email;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// Verified against when the email is unknown, so both failure paths cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("timing-equalizer-not-a-password").ok());

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the PHC-formatted hash.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password is valid, `false` otherwise.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    Ok(result)
}

/// Creates a new account. Does not log the user in.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `name` - The display name.
/// * `email` - The email, normalized before storage.
/// * `password` - The plaintext password.
///
/// # Returns
///
/// A `Result` containing the created `User`, or `DuplicateAccount`.
pub async fn signup(state: &AppState, name: &str, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email);
    tracing::debug!("🔐 Creating account: {}", email);

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateAccount);
    }

    let password_hash = hash_password(password)?;
    let user = state
        .users
        .create(name.trim(), &email, &password_hash)
        .await?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(user)
}

/// Checks credentials and opens a session.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `email` - The email as submitted.
/// * `password` - The plaintext password.
///
/// # Returns
///
/// The bearer token for the cookie and the stored `Session`. Fails with
/// `InvalidCredentials` without saying which half was wrong.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(String, Session)> {
    let email = normalize_email(email);
    tracing::debug!("🔐 Authenticating user: {}", email);

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let session = Session::new(
        user.id,
        chrono::Duration::days(state.config.session_duration_days),
    );
    let session_token = token::generate_session_token();
    state
        .sessions
        .save(&token::session_key(&session_token), &session)
        .await?;

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok((session_token, session))
}

/// Deletes the session behind `session_token`, if any.
pub async fn logout(state: &AppState, session_token: &str) -> Result<()> {
    state
        .sessions
        .delete(&token::session_key(session_token))
        .await
}

/// Resolves a cookie token into the request's auth state.
///
/// Unknown tokens are anonymous; expired sessions are deleted and anonymous.
pub async fn resolve(state: &AppState, session_token: Option<&str>) -> Result<AuthState> {
    let Some(session_token) = session_token else {
        return Ok(AuthState::Anonymous);
    };

    let key = token::session_key(session_token);
    let Some(session) = state.sessions.get(&key).await? else {
        tracing::debug!("Unknown session {}…", &key[..8]);
        return Ok(AuthState::Anonymous);
    };

    if session.is_expired_at(chrono::Utc::now()) {
        tracing::warn!("❌ Session expired for user: {}", session.user_id);
        state.sessions.delete(&key).await?;
        return Ok(AuthState::Anonymous);
    }

    Ok(AuthState::Authenticated(session))
}

/// Loads the account behind a session.
pub async fn current_user(state: &AppState, session: &Session) -> Result<User> {
    state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}
