use axum::{
    extract::{FromRef, Path, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, RegisterResponse, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:username", get(get_user))
        .route("/users", get(list_users))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err(ApiError::Validation("Invalid username".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Fast path; the unique constraint still decides under races.
    if User::find_by_username(&state.db, &payload.username)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::DuplicateUsername);
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(Json(RegisterResponse {
        username: user.username,
        email: user.email,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let username = payload.username.trim();

    let user = User::find_by_username(&state.db, username)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| {
            warn!(username = %username, "login unknown username");
            ApiError::Unauthenticated("Invalid username or password")
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(username = %username, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated("Invalid username or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(&user.username).map_err(ApiError::Internal)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

#[instrument(skip(state, _current))]
pub async fn get_user(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_username(&state.db, &username)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, _current))]
pub async fn list_users(
    State(state): State<AppState>,
    _current: CurrentUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
