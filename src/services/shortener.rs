use uuid::Uuid;

use crate::{
    config::MAX_SHORT_ID_LENGTH,
    crypto::short_id::is_well_formed,
    error::{AppError, Result},
    models::url_mapping::UrlMapping,
    state::AppState,
    validation::url::validate_target_url,
};

/// Top-level path segments owned by other routes. A short id equal to one of
/// these would never reach the resolver.
pub const RESERVED_IDS: &[&str] = &["url", "login", "signup", "logout", "me", "user"];

/// Validates `raw_url` and stores it under a freshly generated short id.
///
/// Every call mints a new id, even for a URL that is already stored.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `raw_url` - The submitted target.
/// * `owner_id` - The submitting user, if authenticated.
///
/// # Returns
///
/// The committed `UrlMapping`. Fails with `InvalidUrl` before any write, or
/// `GenerationExhausted` when every candidate collided.
pub async fn shorten(state: &AppState, raw_url: &str, owner_id: Option<Uuid>) -> Result<UrlMapping> {
    let original_url = validate_target_url(raw_url)?;
    let max_attempts = state.config.max_generation_attempts;

    for attempt in 1..=max_attempts {
        let candidate = state.ids.generate();
        if RESERVED_IDS.contains(&candidate.as_str()) {
            tracing::debug!("Discarding reserved candidate `{}`", candidate);
            continue;
        }

        let mapping = UrlMapping::new(candidate, original_url.clone(), owner_id);
        match state.mappings.put(&mapping).await {
            Ok(()) => {
                tracing::info!(short_id = %mapping.short_id, attempt, "✅ Short link created");
                return Ok(mapping);
            }
            Err(AppError::DuplicateKey) => {
                tracing::warn!(
                    short_id = %mapping.short_id,
                    attempt,
                    "Short id collision, retrying"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::GenerationExhausted)
}

/// Resolves a short id to its redirect target.
pub async fn resolve(state: &AppState, short_id: &str) -> Result<String> {
    if !is_well_formed(short_id, MAX_SHORT_ID_LENGTH) {
        return Err(AppError::NotFound);
    }

    state
        .mappings
        .get(short_id)
        .await?
        .map(|mapping| mapping.original_url)
        .ok_or(AppError::NotFound)
}

/// Lists the links `owner_id` created, newest first.
pub async fn list_for_owner(state: &AppState, owner_id: Uuid) -> Result<Vec<UrlMapping>> {
    state.mappings.list_by_owner(owner_id).await
}

/// Deletes one of `owner_id`'s links. Someone else's link is reported as
/// not found.
pub async fn delete_for_owner(state: &AppState, short_id: &str, owner_id: Uuid) -> Result<()> {
    if !is_well_formed(short_id, MAX_SHORT_ID_LENGTH) {
        return Err(AppError::NotFound);
    }

    if state.mappings.delete(short_id, owner_id).await? {
        tracing::info!(short_id, %owner_id, "🗑️ Short link deleted");
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}
