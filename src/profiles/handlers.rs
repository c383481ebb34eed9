use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::ApiError,
    profiles::repo::Profile,
    profiles::services::{delete_picture, read_profile_form, store_picture},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/me", get(get_my_profile))
        .route("/profiles/:id", get(get_profile))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles", post(create_profile))
        .route("/profiles/:id", put(update_profile))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

/// POST /profiles (multipart: description, likes, dislikes, hobbies as
/// comma-separated strings, file). One profile per user; the user_id unique
/// constraint decides races.
#[instrument(skip(state, current, mp))]
pub async fn create_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let CurrentUser(user) = current;
    let form = read_profile_form(mp).await?;

    let picture_key = match &form.picture {
        Some(pic) => Some(
            store_picture(&state, user.id, pic)
                .await
                .map_err(ApiError::Internal)?,
        ),
        None => None,
    };

    let res = Profile::create(
        &state.db,
        user.id,
        form.description.as_deref(),
        form.likes.as_deref().unwrap_or(&[]),
        form.dislikes.as_deref().unwrap_or(&[]),
        form.hobbies.as_deref().unwrap_or(&[]),
        picture_key.as_deref(),
    )
    .await;

    match res {
        Ok(profile) => {
            info!(user_id = %user.id, profile_id = %profile.id, "profile created");
            Ok((StatusCode::CREATED, Json(profile)))
        }
        Err(e) => {
            // The row lost; don't leave the picture orphaned on disk.
            if let Some(key) = &picture_key {
                delete_picture(&state, key).await;
            }
            Err(e)
        }
    }
}

/// PUT /profiles/:id (multipart, optional file). Partial update: absent
/// fields keep their stored values; the picture is replaced only when a new
/// file is supplied.
#[instrument(skip(state, current, mp))]
pub async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<Profile>, ApiError> {
    let CurrentUser(user) = current;
    let existing = Profile::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .filter(|p| p.user_id == user.id)
        .ok_or(ApiError::NotFound("profile"))?;

    let form = read_profile_form(mp).await?;

    let new_picture_key = match &form.picture {
        Some(pic) => Some(
            store_picture(&state, user.id, pic)
                .await
                .map_err(ApiError::Internal)?,
        ),
        None => None,
    };

    let description = form.description.or(existing.description);
    let likes = form.likes.unwrap_or(existing.likes);
    let dislikes = form.dislikes.unwrap_or(existing.dislikes);
    let hobbies = form.hobbies.unwrap_or(existing.hobbies);
    let picture = new_picture_key
        .clone()
        .or_else(|| existing.profile_picture.clone());

    let res = Profile::update(
        &state.db,
        id,
        description.as_deref(),
        &likes,
        &dislikes,
        &hobbies,
        picture.as_deref(),
    )
    .await;

    let profile = match res {
        Ok(p) => p,
        Err(e) => {
            // Same orphan rule as create: a stored picture the row never
            // recorded gets removed.
            if let Some(key) = &new_picture_key {
                delete_picture(&state, key).await;
            }
            return Err(ApiError::Internal(e));
        }
    };

    // New picture stored and recorded; drop the replaced one.
    if new_picture_key.is_some() {
        if let Some(old) = &existing.profile_picture {
            delete_picture(&state, old).await;
        }
    }

    info!(user_id = %user.id, profile_id = %profile.id, "profile updated");
    Ok(Json(profile))
}

/// GET /profiles/me
#[instrument(skip(state, current))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Profile>, ApiError> {
    let CurrentUser(user) = current;
    let profile = Profile::find_by_user(&state.db, user.id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

/// GET /profiles/:id
#[instrument(skip(state, _current))]
pub async fn get_profile(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("profile"))?;
    Ok(Json(profile))
}

/// GET /profiles
#[instrument(skip(state, _current))]
pub async fn list_profiles(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = Profile::list(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(profiles))
}
