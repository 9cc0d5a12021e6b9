//! Admin oversight: aggregate stats and user/property management.
//!
//! Aggregates are computed per request by scanning the store; at this
//! system's scale there is no caching or incremental maintenance.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{BookingStatus, Claims, Role, UserView};

use super::{require_role, ApiResponse, AppState};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: usize,
    pub total_properties: usize,
    pub total_bookings: usize,
    pub active_listings: usize,
    pub new_users_this_month: usize,
    pub new_properties_this_month: usize,
    pub revenue_this_month: f64,
}

#[derive(Serialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: UserView,
    pub total_bookings: usize,
}

#[derive(Serialize)]
pub struct AdminProperty {
    pub id: Uuid,
    pub title: String,
    pub rent: f64,
    pub location: String,
    pub owner_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AdminStats>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    let now = Utc::now();
    let this_month = |date: chrono::DateTime<Utc>| {
        date.year() == now.year() && date.month() == now.month()
    };

    let users = state.store.users()?;
    let properties = state.store.properties()?;
    let bookings = state.store.bookings()?;

    // Revenue this month: rent of bookings approved in the current month.
    let mut revenue_this_month = 0.0;
    for booking in &bookings {
        if booking.status != BookingStatus::Approved {
            continue;
        }
        let approved_this_month = booking.response_time.map_or(false, this_month);
        if !approved_this_month {
            continue;
        }
        if let Some(property) = state.store.property(booking.property_id)? {
            revenue_this_month += property.rent;
        }
    }

    let stats = AdminStats {
        total_users: users.len(),
        total_properties: properties.len(),
        total_bookings: bookings.len(),
        active_listings: properties.iter().filter(|p| p.is_available).count(),
        new_users_this_month: users.iter().filter(|u| this_month(u.created_at)).count(),
        new_properties_this_month: properties
            .iter()
            .filter(|p| this_month(p.created_at))
            .count(),
        revenue_this_month,
    };

    Ok(Json(ApiResponse::ok("Stats retrieved successfully", stats)))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AdminUser>>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    let mut users = state.store.users()?;
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut data = Vec::new();
    for user in users {
        let total_bookings = state.store.bookings_by_tenant(user.id)?.len();
        data.push(AdminUser {
            user: user.view(),
            total_bookings,
        });
    }

    Ok(Json(ApiResponse::ok("Users retrieved successfully", data)))
}

pub async fn list_properties(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AdminProperty>>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    let mut properties = state.store.properties()?;
    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let data = properties
        .into_iter()
        .map(|p| AdminProperty {
            id: p.id,
            title: p.title,
            rent: p.rent,
            location: p.location,
            owner_id: p.owner_id,
        })
        .collect();

    Ok(Json(ApiResponse::ok(
        "Properties retrieved successfully",
        data,
    )))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    if id == claims.sub {
        return Err(ApiError::Validation(
            "You cannot delete your own admin account".to_string(),
        ));
    }
    if state.store.user(id)?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state.store.delete_user(id)?;
    Ok(Json(ApiResponse::msg("User deleted successfully")))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    if state.store.property(id)?.is_none() {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }

    state.store.delete_property(id)?;
    Ok(Json(ApiResponse::msg("Property deleted successfully")))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    require_role(&claims, &[Role::Admin])?;

    let mut user = state
        .store
        .user(id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    user.role = payload.role;
    user.updated_at = Utc::now();
    state.store.update_user(&user)?;

    Ok(Json(ApiResponse::ok(
        "User role updated successfully",
        user.view(),
    )))
}
