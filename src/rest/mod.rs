//! REST API layer using Axum.
//!
//! HTTP/JSON endpoints under `/api` with the uniform response envelope
//! `{success, message, data}`. Stateless handlers: parse, authorize by role,
//! hit the store, respond. Bearer-token auth runs as a middleware layer that
//! attaches the validated [`Claims`] to the request; role checks happen at
//! the top of each protected handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::validate_jwt;
use crate::chatbot::Chatbot;
use crate::config::Config;
use crate::email::Mailer;
use crate::error::ApiError;
use crate::models::{Claims, Role};
use crate::storage::Store;

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod chatbot_routes;
pub mod properties;
pub mod ratings;

/// Shared app state for REST handlers (Sled store clones cheaply; the rest
/// is Arc-wrapped).
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub mailer: Arc<Mailer>,
    pub chatbot: Arc<Chatbot>,
}

/// Uniform response envelope.
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
}

/// List envelope for the paginated property search.
#[derive(Serialize, Deserialize, Debug)]
pub struct PagedResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    let claims = validate_jwt(token, &state.config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Role gate used at the top of protected handlers.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Access denied. Insufficient permissions.".to_string(),
        ))
    }
}

/// Create the Axum router with the full `/api` surface.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/auth/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/properties", post(properties::create_property))
        .route(
            "/properties/owner/my-properties",
            get(properties::owner_properties),
        )
        .route(
            "/properties/:id",
            put(properties::update_property).delete(properties::delete_property),
        )
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/my-bookings", get(bookings::tenant_bookings))
        .route("/bookings/requests", get(bookings::owner_bookings))
        .route("/bookings/stats", get(bookings::booking_stats))
        .route("/bookings/:id/status", patch(bookings::update_booking_status))
        .route("/bookings/:id", delete(bookings::cancel_booking))
        .route("/ratings/property", post(ratings::submit_property_rating))
        .route("/ratings/user", post(ratings::submit_user_rating))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/properties", get(admin::list_properties))
        .route("/admin/users/:id", delete(admin::delete_user))
        .route("/admin/properties/:id", delete(admin::delete_property))
        .route("/admin/users/:id/role", patch(admin::update_user_role))
        .route("/analytics/financial", get(analytics::financial))
        .route("/analytics/properties", get(analytics::property_analytics))
        .route("/analytics/activities", get(analytics::activities))
        .route("/analytics/tenants", get(analytics::tenant_overview))
        .route("/chatbot/message", post(chatbot_routes::send_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/properties", get(properties::list_properties))
        .route("/properties/:id", get(properties::get_property))
        .route("/ratings/property/:id", get(ratings::property_ratings))
        .route("/ratings/user/:id", get(ratings::user_ratings))
        .route("/health", get(health_handler));

    Router::new()
        .nest("/api", public.merge(protected))
        .fallback(route_not_found)
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

#[cfg(test)]
mod tests;
