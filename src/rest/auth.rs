//! Registration, login and profile handlers.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{create_jwt, hash_password, verify_password};
use crate::error::ApiError;
use crate::models::{Claims, Role, User, UserView};

use super::{ApiResponse, AppState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AuthData {
    pub user: UserView,
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::Validation(
            "Please provide a valid email".to_string(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    let role = payload.role.unwrap_or(Role::Tenant);
    if role == Role::Admin {
        return Err(ApiError::Validation(
            "Role must be either owner or tenant".to_string(),
        ));
    }

    if state.store.user_by_email(&payload.email)?.is_some() {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        name: payload.name.trim().to_string(),
        phone: payload.phone,
        role,
        avatar: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_user(&user)?;

    let token = create_jwt(&user, &state.config.jwt_secret)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Registration successful",
            AuthData {
                user: user.view(),
                token,
            },
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let user = state
        .store
        .user_by_email(&payload.email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = create_jwt(&user, &state.config.jwt_secret)?;
    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthData {
            user: user.view(),
            token,
        },
    )))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = state
        .store
        .user(claims.sub)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Profile retrieved successfully",
        user.view(),
    )))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let mut user = state
        .store
        .user(claims.sub)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(phone) = payload.phone {
        user.phone = Some(phone);
    }
    if let Some(avatar) = payload.avatar {
        user.avatar = Some(avatar);
    }
    user.updated_at = Utc::now();
    state.store.update_user(&user)?;

    Ok(Json(ApiResponse::ok(
        "Profile updated successfully",
        user.view(),
    )))
}
