//! Property listing, search and management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{BookingStatus, Claims, Property, PropertyRating, PropertyType, Role};

use super::{require_role, ApiResponse, AppState, PagedResponse, Pagination};

const DEFAULT_PAGE_SIZE: usize = 12;
const MAX_PAGE_SIZE: usize = 50;

#[derive(Deserialize)]
pub struct PropertyFilters {
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "minRent")]
    pub min_rent: Option<f64>,
    #[serde(rename = "maxRent")]
    pub max_rent: Option<f64>,
    pub bedrooms: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Listing row: the property plus owner contact and the live rating summary.
#[derive(Serialize)]
pub struct PropertySummary {
    #[serde(flatten)]
    pub property: Property,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub average_rating: Option<f64>,
    pub rating_count: usize,
}

/// Owner-dashboard row: the property plus live booking counters.
#[derive(Serialize)]
pub struct OwnerProperty {
    #[serde(flatten)]
    pub property: Property,
    pub pending_requests: usize,
    pub approved_bookings: usize,
}

fn rating_summary(ratings: &[PropertyRating]) -> (Option<f64>, usize) {
    if ratings.is_empty() {
        return (None, 0);
    }
    let sum: f64 = ratings.iter().map(|r| r.rating as f64).sum();
    let avg = sum / ratings.len() as f64;
    (Some((avg * 10.0).round() / 10.0), ratings.len())
}

fn summarize(state: &AppState, property: Property) -> Result<PropertySummary, ApiError> {
    let owner = state.store.user(property.owner_id)?;
    let ratings = state.store.property_ratings_for(property.id)?;
    let (average_rating, rating_count) = rating_summary(&ratings);
    Ok(PropertySummary {
        property,
        owner_name: owner.as_ref().map(|u| u.name.clone()),
        owner_email: owner.as_ref().map(|u| u.email.clone()),
        owner_phone: owner.and_then(|u| u.phone),
        average_rating,
        rating_count,
    })
}

/// Public search over available listings with filters and pagination.
pub async fn list_properties(
    State(state): State<AppState>,
    Query(filters): Query<PropertyFilters>,
) -> Result<Json<PagedResponse<PropertySummary>>, ApiError> {
    let page = filters.page.unwrap_or(1).max(1);
    let limit = filters
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let mut matches: Vec<Property> = state
        .store
        .properties()?
        .into_iter()
        .filter(|p| p.is_available)
        .filter(|p| {
            filters.title.as_ref().map_or(true, |t| {
                p.title.to_lowercase().contains(&t.to_lowercase())
            })
        })
        .filter(|p| {
            filters.location.as_ref().map_or(true, |l| {
                p.location.to_lowercase().contains(&l.to_lowercase())
            })
        })
        .filter(|p| filters.min_rent.map_or(true, |min| p.rent >= min))
        .filter(|p| filters.max_rent.map_or(true, |max| p.rent <= max))
        .filter(|p| filters.bedrooms.map_or(true, |beds| p.bedrooms >= beds))
        .filter(|p| filters.property_type.map_or(true, |t| p.property_type == t))
        .collect();
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = matches.len();
    let total_pages = (total + limit - 1) / limit;
    let mut data = Vec::new();
    for property in matches.into_iter().skip((page - 1) * limit).take(limit) {
        data.push(summarize(&state, property)?);
    }

    Ok(Json(PagedResponse {
        success: true,
        message: "Properties retrieved successfully".to_string(),
        data,
        pagination: Pagination {
            total,
            page,
            limit,
            total_pages,
        },
    }))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PropertySummary>>, ApiError> {
    let property = state
        .store
        .property(id)?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    Ok(Json(ApiResponse::ok(
        "Property retrieved successfully",
        summarize(&state, property)?,
    )))
}

#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub title: String,
    pub description: Option<String>,
    pub rent: f64,
    pub location: String,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area_sqft: Option<u32>,
    pub property_type: Option<PropertyType>,
}

pub async fn create_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Property>>), ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation(
            "Property title is required".to_string(),
        ));
    }
    if payload.location.trim().is_empty() {
        return Err(ApiError::Validation("Location is required".to_string()));
    }
    if payload.rent <= 0.0 {
        return Err(ApiError::Validation(
            "Rent must be greater than zero".to_string(),
        ));
    }

    let now = Utc::now();
    let property = Property {
        id: Uuid::new_v4(),
        owner_id: claims.sub,
        title: payload.title.trim().to_string(),
        description: payload.description,
        rent: payload.rent,
        location: payload.location.trim().to_string(),
        amenities: payload.amenities.unwrap_or_default(),
        photos: payload.photos.unwrap_or_default(),
        bedrooms: payload.bedrooms.unwrap_or(1),
        bathrooms: payload.bathrooms.unwrap_or(1),
        area_sqft: payload.area_sqft,
        property_type: payload.property_type.unwrap_or_default(),
        is_available: true,
        created_at: now,
        updated_at: now,
    };
    state.store.create_property(&property)?;

    // Broadcast to tenants off the request path; the listing is already
    // committed and a mail failure must not surface here.
    let owner_name = state
        .store
        .user(claims.sub)?
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown Owner".to_string());
    let tenant_emails: Vec<String> = state
        .store
        .users()?
        .into_iter()
        .filter(|u| u.role == Role::Tenant)
        .map(|u| u.email)
        .collect();
    let mailer = state.mailer.clone();
    let announced = property.clone();
    tokio::spawn(async move {
        mailer
            .notify_tenants_new_property(&tenant_emails, &announced, &owner_name)
            .await;
    });

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Property created successfully", property)),
    ))
}

#[derive(Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub rent: Option<f64>,
    pub location: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub area_sqft: Option<u32>,
    pub property_type: Option<PropertyType>,
    pub is_available: Option<bool>,
}

pub async fn update_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> Result<Json<ApiResponse<Property>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    let mut property = state
        .store
        .property(id)?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    if property.owner_id != claims.sub && claims.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only update your own properties".to_string(),
        ));
    }

    if let Some(title) = payload.title {
        property.title = title;
    }
    if let Some(description) = payload.description {
        property.description = Some(description);
    }
    if let Some(rent) = payload.rent {
        property.rent = rent;
    }
    if let Some(location) = payload.location {
        property.location = location;
    }
    if let Some(amenities) = payload.amenities {
        property.amenities = amenities;
    }
    if let Some(photos) = payload.photos {
        property.photos = photos;
    }
    if let Some(bedrooms) = payload.bedrooms {
        property.bedrooms = bedrooms;
    }
    if let Some(bathrooms) = payload.bathrooms {
        property.bathrooms = bathrooms;
    }
    if let Some(area_sqft) = payload.area_sqft {
        property.area_sqft = Some(area_sqft);
    }
    if let Some(property_type) = payload.property_type {
        property.property_type = property_type;
    }
    if let Some(is_available) = payload.is_available {
        property.is_available = is_available;
    }
    property.updated_at = Utc::now();
    state.store.update_property(&property)?;

    Ok(Json(ApiResponse::ok(
        "Property updated successfully",
        property,
    )))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    let property = state
        .store
        .property(id)?
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))?;

    if property.owner_id != claims.sub && claims.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only delete your own properties".to_string(),
        ));
    }

    state.store.delete_property(id)?;
    Ok(Json(ApiResponse::msg("Property deleted successfully")))
}

pub async fn owner_properties(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<OwnerProperty>>>, ApiError> {
    require_role(&claims, &[Role::Owner, Role::Admin])?;

    let mut properties = state.store.properties_by_owner(claims.sub)?;
    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut data = Vec::new();
    for property in properties {
        let bookings = state.store.bookings_by_property(property.id)?;
        let pending_requests = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .count();
        let approved_bookings = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Approved)
            .count();
        data.push(OwnerProperty {
            property,
            pending_requests,
            approved_bookings,
        });
    }

    Ok(Json(ApiResponse::ok(
        "Owner properties retrieved successfully",
        data,
    )))
}
