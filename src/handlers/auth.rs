use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::time::Duration;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    middleware_layer::auth::{extract_session_token, SESSION_COOKIE},
    models::{session::Session, user::UserProfile},
    services::auth as auth_service,
    state::AppState,
    validation::auth::{normalize_email, require_credentials, validate_payload},
};

/// The request payload for account creation.
#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[garde(length(chars, min = 1, max = 100))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// The request payload for user login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Creates the session cookie.
fn create_session_cookie(value: String, max_age_days: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::days(max_age_days));
    cookie.set_path("/");
    cookie
}

/// Handles account creation. The client logs in separately afterwards.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<Response> {
    payload.name = payload.name.trim().to_string();
    payload.email = normalize_email(&payload.email);
    validate_payload(&payload)?;

    tracing::info!("📝 Signup attempt for: {}", payload.email);

    let user = auth_service::signup(&state, &payload.name, &payload.email, &payload.password).await?;

    let response = AuthResponse {
        success: true,
        message: "Signup successful. Please log in.".to_string(),
        user: Some(UserProfile::from(&user)),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    require_credentials(&payload.email, &payload.password)?;

    let (session_token, session) =
        auth_service::login(&state, &payload.email, &payload.password).await?;

    cookies.add(create_session_cookie(
        session_token,
        state.config.session_duration_days,
        state.config.is_production,
    ));
    tracing::info!("✅ User logged in: {}", session.user_id);

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        user: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    cookies: Cookies,
) -> Result<Response> {
    if let Some(session_token) = extract_session_token(&cookies) {
        auth_service::logout(&state, &session_token).await?;
    }

    let mut session_cookie = Cookie::new(SESSION_COOKIE, "");
    session_cookie.set_path("/");
    cookies.remove(session_cookie);

    tracing::info!("👋 User logged out: {}", session.user_id);

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
        user: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the authenticated account.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<UserProfile>> {
    let user = auth_service::current_user(&state, &session).await?;
    Ok(Json(UserProfile::from(&user)))
}
