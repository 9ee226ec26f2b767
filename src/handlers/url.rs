use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::{
        session::{AuthState, Session},
        url_mapping::UrlMapping,
    },
    services::shortener,
    state::AppState,
};

/// The request payload for shortening a URL.
#[derive(Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

/// The response payload for a created link.
#[derive(Serialize)]
pub struct ShortenResponse {
    #[serde(rename = "shortID")]
    pub short_id: String,
    #[serde(rename = "shortUrl")]
    pub short_url: String,
}

/// One entry of a user's link listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    #[serde(rename = "shortID")]
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct LinkListResponse {
    pub urls: Vec<LinkSummary>,
    pub count: usize,
}

impl LinkSummary {
    fn from_mapping(state: &AppState, mapping: UrlMapping) -> Self {
        Self {
            short_url: state.config.short_url(&mapping.short_id),
            short_id: mapping.short_id,
            original_url: mapping.original_url,
            created_at: mapping.created_at,
        }
    }
}

/// Shortens a URL. Anonymous callers are accepted unless
/// `ALLOW_ANONYMOUS_SHORTEN` is off; authenticated callers become the owner.
#[axum::debug_handler]
pub async fn shorten(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(req): Json<ShortenRequest>,
) -> Result<Response> {
    let owner_id = auth.session().map(|session| session.user_id);
    if owner_id.is_none() && !state.config.allow_anonymous_shorten {
        return Err(AppError::Unauthorized);
    }

    let mapping = shortener::shorten(&state, &req.url, owner_id).await?;

    let response = ShortenResponse {
        short_url: state.config.short_url(&mapping.short_id),
        short_id: mapping.short_id,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Lists the caller's links.
#[axum::debug_handler]
pub async fn list_links(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<LinkListResponse>> {
    let urls: Vec<LinkSummary> = shortener::list_for_owner(&state, session.user_id)
        .await?
        .into_iter()
        .map(|mapping| LinkSummary::from_mapping(&state, mapping))
        .collect();

    Ok(Json(LinkListResponse {
        count: urls.len(),
        urls,
    }))
}

/// Deletes one of the caller's links.
#[axum::debug_handler]
pub async fn delete_link(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(short_id): Path<String>,
) -> Result<Response> {
    shortener::delete_for_owner(&state, &short_id, session.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(Message {
            message: "Short link deleted successfully",
        }),
    )
        .into_response())
}

/// Redirects a short id to its target.
#[axum::debug_handler]
pub async fn redirect(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Response> {
    let target = shortener::resolve(&state, &short_id).await?;

    let location = HeaderValue::from_str(&target).map_err(|_| {
        AppError::Internal(format!("Stored URL for {} is not a valid header", short_id))
    })?;

    tracing::debug!(short_id = %short_id, "↪️ Redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}
