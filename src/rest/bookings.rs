//! Booking request workflow: create, list, approve/reject, cancel.
//!
//! States: Pending -> {Approved, Rejected} (terminal); a Pending booking may
//! be cancelled (hard-deleted) by its tenant. Status transitions are gated
//! on property ownership (or admin) and stamp `response_time`. Notification
//! emails are best-effort and never fail the request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Booking, BookingStatus, Claims, Property, Role};

use super::{require_role, ApiResponse, AppState};

const MAX_DURATION_MONTHS: u32 = 60;
const DEFAULT_DURATION_MONTHS: u32 = 12;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub duration_months: Option<u32>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub owner_notes: Option<String>,
}

/// Booking enriched with the property it targets.
#[derive(Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub property_title: String,
    pub property_location: String,
    pub property_rent: f64,
}

/// Tenant-side listing row: property plus owner contact.
#[derive(Serialize)]
pub struct TenantBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub property_title: String,
    pub property_location: String,
    pub property_rent: f64,
    pub property_photos: Vec<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

/// Owner-side listing row: property plus requesting tenant contact.
#[derive(Serialize)]
pub struct OwnerBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub property_title: String,
    pub property_location: String,
    pub property_rent: f64,
    pub tenant_name: Option<String>,
    pub tenant_email: Option<String>,
    pub tenant_phone: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct BookingStats {
    pub total_properties: usize,
    pub total_requests: usize,
    pub pending_requests: usize,
    pub approved_bookings: usize,
    pub rejected_requests: usize,
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDetail>>), ApiError> {
    require_role(&claims, &[Role::Tenant])?;

    let duration_months = payload.duration_months.unwrap_or(DEFAULT_DURATION_MONTHS);
    if duration_months == 0 || duration_months > MAX_DURATION_MONTHS {
        return Err(ApiError::Validation(
            "Duration must be between 1 and 60 months".to_string(),
        ));
    }

    let property = state
        .store
        .property(payload.property_id)?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    if !property.is_available {
        return Err(ApiError::Validation(
            "Property is not available for booking".to_string(),
        ));
    }
    if property.owner_id == claims.sub {
        return Err(ApiError::Validation(
            "You cannot book your own property".to_string(),
        ));
    }

    // Read-then-write duplicate check; the race window between the check and
    // the insert is a known gap of this schema.
    if state
        .store
        .has_pending_booking(property.id, claims.sub)?
    {
        return Err(ApiError::Validation(
            "You already have a pending booking request for this property".to_string(),
        ));
    }

    let booking = Booking {
        id: Uuid::new_v4(),
        property_id: property.id,
        tenant_id: claims.sub,
        status: BookingStatus::Pending,
        message: payload.message,
        move_in_date: payload.move_in_date,
        duration_months,
        request_time: Utc::now(),
        response_time: None,
        owner_notes: None,
    };
    state.store.create_booking(&booking)?;

    // Best-effort owner notification, after the row exists.
    let tenant_name = state
        .store
        .user(claims.sub)?
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown Tenant".to_string());
    if let Some(owner) = state.store.user(property.owner_id)? {
        state
            .mailer
            .notify_owner_booking_request(&owner.email, &owner.name, &tenant_name, &property)
            .await;
    }

    let detail = BookingDetail {
        booking,
        property_title: property.title,
        property_location: property.location,
        property_rent: property.rent,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Booking request submitted successfully",
            detail,
        )),
    ))
}

pub async fn tenant_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<TenantBooking>>>, ApiError> {
    require_role(&claims, &[Role::Tenant])?;

    let mut bookings = state.store.bookings_by_tenant(claims.sub)?;
    bookings.sort_by(|a, b| b.request_time.cmp(&a.request_time));

    let mut data = Vec::new();
    for booking in bookings {
        let property = match state.store.property(booking.property_id)? {
            Some(p) => p,
            None => continue,
        };
        let owner = state.store.user(property.owner_id)?;
        data.push(TenantBooking {
            booking,
            property_title: property.title,
            property_location: property.location,
            property_rent: property.rent,
            property_photos: property.photos,
            owner_name: owner.as_ref().map(|u| u.name.clone()),
            owner_email: owner.as_ref().map(|u| u.email.clone()),
            owner_phone: owner.and_then(|u| u.phone),
        });
    }

    Ok(Json(ApiResponse::ok(
        "Bookings retrieved successfully",
        data,
    )))
}

pub async fn owner_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<OwnerBooking>>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    let mut rows = Vec::new();
    for property in state.store.properties_by_owner(claims.sub)? {
        for booking in state.store.bookings_by_property(property.id)? {
            let tenant = state.store.user(booking.tenant_id)?;
            rows.push(OwnerBooking {
                booking,
                property_title: property.title.clone(),
                property_location: property.location.clone(),
                property_rent: property.rent,
                tenant_name: tenant.as_ref().map(|u| u.name.clone()),
                tenant_email: tenant.as_ref().map(|u| u.email.clone()),
                tenant_phone: tenant.and_then(|u| u.phone),
            });
        }
    }
    rows.sort_by(|a, b| b.booking.request_time.cmp(&a.booking.request_time));

    Ok(Json(ApiResponse::ok(
        "Booking requests retrieved successfully",
        rows,
    )))
}

pub async fn booking_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<BookingStats>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    let properties = state.store.properties_by_owner(claims.sub)?;
    let mut stats = BookingStats {
        total_properties: properties.len(),
        total_requests: 0,
        pending_requests: 0,
        approved_bookings: 0,
        rejected_requests: 0,
    };
    for property in &properties {
        for booking in state.store.bookings_by_property(property.id)? {
            stats.total_requests += 1;
            match booking.status {
                BookingStatus::Pending => stats.pending_requests += 1,
                BookingStatus::Approved => stats.approved_bookings += 1,
                BookingStatus::Rejected => stats.rejected_requests += 1,
            }
        }
    }

    Ok(Json(ApiResponse::ok("Stats retrieved successfully", stats)))
}

fn parse_status(raw: &str) -> Result<BookingStatus, ApiError> {
    match raw {
        "Pending" => Ok(BookingStatus::Pending),
        "Approved" => Ok(BookingStatus::Approved),
        "Rejected" => Ok(BookingStatus::Rejected),
        _ => Err(ApiError::Validation(
            "Status must be Pending, Approved, or Rejected".to_string(),
        )),
    }
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OwnerBooking>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;
    let status = parse_status(&payload.status)?;

    let mut booking = state
        .store
        .booking(id)?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    let property: Property = state
        .store
        .property(booking.property_id)?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    if property.owner_id != claims.sub && claims.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only update bookings for your own properties".to_string(),
        ));
    }

    booking.status = status;
    booking.owner_notes = payload.owner_notes;
    booking.response_time = Some(Utc::now());
    state.store.update_booking(&booking)?;

    // Best-effort tenant notification reflecting the new status.
    let tenant = state.store.user(booking.tenant_id)?;
    if let Some(tenant) = &tenant {
        let owner_name = state
            .store
            .user(claims.sub)?
            .map(|u| u.name)
            .unwrap_or_else(|| "Owner".to_string());
        state
            .mailer
            .notify_tenant_booking_status(&tenant.email, &tenant.name, &property, status, &owner_name)
            .await;
    }

    let message = format!("Booking {} successfully", status.to_string().to_lowercase());
    let row = OwnerBooking {
        booking,
        property_title: property.title,
        property_location: property.location,
        property_rent: property.rent,
        tenant_name: tenant.as_ref().map(|u| u.name.clone()),
        tenant_email: tenant.as_ref().map(|u| u.email.clone()),
        tenant_phone: tenant.and_then(|u| u.phone),
    };
    Ok(Json(ApiResponse::ok(message, row)))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_role(&claims, &[Role::Tenant])?;

    let booking = state
        .store
        .booking(id)?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

    if booking.tenant_id != claims.sub {
        return Err(ApiError::Forbidden(
            "You can only cancel your own bookings".to_string(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(ApiError::Validation(
            "Only pending bookings can be cancelled".to_string(),
        ));
    }

    state.store.delete_booking(id)?;
    Ok(Json(ApiResponse::msg("Booking cancelled successfully")))
}
