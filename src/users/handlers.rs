//! HTTP handlers for the credential store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::metrics::USERS_CREATED_TOTAL;
use crate::server::AppState;

use super::{password, AuthRequest, CreateUserRequest, User, UserView};

/// Identical response for unknown usernames and wrong passwords, so the
/// endpoint cannot be used to enumerate accounts.
const GENERIC_AUTH_ERROR: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserView>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub username: String,
    pub email: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub token: String,
}

/// POST /User/{username}
pub async fn create_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>)> {
    password::validate_email(&body.email)?;
    password::validate_complexity(&body.password)?;

    // Friendly pre-checks; the store's unique constraints remain the
    // final guard against a concurrent duplicate insert.
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            username
        )));
    }
    if state.users.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&body.password)?;
    let user = User {
        username: username.clone(),
        password_hash,
        company_name: body.company_name,
        email: body.email.clone(),
    };

    state.users.insert(user).await?;
    USERS_CREATED_TOTAL.inc();

    tracing::info!(username = %username, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "Account created successfully".to_string(),
            username,
            email: body.email,
        }),
    ))
}

/// GET /User
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state.users.list().await?;

    Ok(Json(UsersResponse {
        users: users.iter().map(User::view).collect(),
    }))
}

/// POST /AUser/{username}
pub async fn authenticate(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<AuthRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Auth(GENERIC_AUTH_ERROR.to_string()))?;

    if !password::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Auth(GENERIC_AUTH_ERROR.to_string()));
    }

    let token = state.jwt.issue(&user.username)?;

    tracing::info!(username = %user.username, "Authentication successful");

    Ok(Json(AuthResponse {
        message: "Authentication successful".to_string(),
        username: user.username,
        email: user.email,
        company_name: user.company_name,
        token,
    }))
}
