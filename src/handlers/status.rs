use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{
    error::{AppError, Result},
    models::{session::AuthState, user::UserProfile},
    services::auth as auth_service,
    state::AppState,
};

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Liveness probe that also tells the client whether its cookie is valid.
///
/// A session whose account no longer exists reads as anonymous; store
/// failures surface as errors.
#[axum::debug_handler]
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
) -> Result<Json<StatusResponse>> {
    let user = match auth.session() {
        Some(session) => match auth_service::current_user(&state, session).await {
            Ok(user) => Some(UserProfile::from(&user)),
            Err(AppError::Unauthorized) => None,
            Err(e) => return Err(e),
        },
        None => None,
    };

    Ok(Json(StatusResponse {
        status: "ok",
        authenticated: user.is_some(),
        user,
    }))
}
