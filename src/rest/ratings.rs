//! Rating submission and retrieval.
//!
//! Submitting requires proof of relationship: an Approved booking linking
//! the reviewer and the target. Resubmission upserts on the unique pair, so
//! repeated submissions can never duplicate a row. Summaries are live
//! AVG/COUNT computed at read time.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Claims, PropertyRating, Role, UserRating};

use super::{ApiResponse, AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRatingRequest {
    pub property_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingRequest {
    pub target_user_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct RatingSummary {
    /// Average with one decimal, as a string ("4.5"); "0.0" when unrated.
    pub average_rating: String,
    pub rating_count: usize,
}

#[derive(Serialize)]
pub struct ReviewRow<T: Serialize> {
    #[serde(flatten)]
    pub rating: T,
    pub reviewer_name: Option<String>,
    pub reviewer_avatar: Option<String>,
}

#[derive(Serialize)]
pub struct RatingsData<T: Serialize> {
    pub summary: RatingSummary,
    pub reviews: Vec<ReviewRow<T>>,
}

fn validate_rating(rating: u8) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Invalid rating. Must be between 1 and 5.".to_string(),
        ));
    }
    Ok(())
}

fn summarize(values: &[u8]) -> RatingSummary {
    if values.is_empty() {
        return RatingSummary {
            average_rating: "0.0".to_string(),
            rating_count: 0,
        };
    }
    let avg = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
    RatingSummary {
        average_rating: format!("{avg:.1}"),
        rating_count: values.len(),
    }
}

pub async fn submit_property_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PropertyRatingRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_rating(payload.rating)?;

    if !state
        .store
        .has_approved_booking(payload.property_id, claims.sub)?
    {
        return Err(ApiError::Forbidden(
            "You can only rate properties where you have an approved booking.".to_string(),
        ));
    }

    state.store.upsert_property_rating(
        payload.property_id,
        claims.sub,
        payload.rating,
        payload.comment,
    )?;

    Ok(Json(ApiResponse::msg(
        "Property rating submitted successfully.",
    )))
}

pub async fn submit_user_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UserRatingRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_rating(payload.rating)?;

    if payload.target_user_id == claims.sub {
        return Err(ApiError::Validation("You cannot rate yourself.".to_string()));
    }

    let linked = state
        .store
        .users_share_approved_booking(claims.sub, payload.target_user_id)?;
    if !linked && claims.role != Role::Admin {
        return Err(ApiError::Forbidden(
            "You can only rate users with whom you have a shared approved booking.".to_string(),
        ));
    }

    state.store.upsert_user_rating(
        claims.sub,
        payload.target_user_id,
        payload.rating,
        payload.comment,
    )?;

    Ok(Json(ApiResponse::msg("User rating submitted successfully.")))
}

pub async fn property_ratings(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RatingsData<PropertyRating>>>, ApiError> {
    let mut ratings = state.store.property_ratings_for(property_id)?;
    ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let summary = summarize(&ratings.iter().map(|r| r.rating).collect::<Vec<_>>());
    let mut reviews = Vec::new();
    for rating in ratings {
        let reviewer = state.store.user(rating.tenant_id)?;
        reviews.push(ReviewRow {
            rating,
            reviewer_name: reviewer.as_ref().map(|u| u.name.clone()),
            reviewer_avatar: reviewer.and_then(|u| u.avatar),
        });
    }

    Ok(Json(ApiResponse::ok(
        "Ratings retrieved successfully",
        RatingsData { summary, reviews },
    )))
}

pub async fn user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RatingsData<UserRating>>>, ApiError> {
    let mut ratings = state.store.user_ratings_for(user_id)?;
    ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let summary = summarize(&ratings.iter().map(|r| r.rating).collect::<Vec<_>>());
    let mut reviews = Vec::new();
    for rating in ratings {
        let reviewer = state.store.user(rating.reviewer_id)?;
        reviews.push(ReviewRow {
            rating,
            reviewer_name: reviewer.as_ref().map(|u| u.name.clone()),
            reviewer_avatar: reviewer.and_then(|u| u.avatar),
        });
    }

    Ok(Json(ApiResponse::ok(
        "Ratings retrieved successfully",
        RatingsData { summary, reviews },
    )))
}
