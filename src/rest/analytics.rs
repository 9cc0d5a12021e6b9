//! Owner dashboard analytics.
//!
//! Read-only aggregates over the caller's properties and bookings, computed
//! per request straight off the store; the polling dashboards refetch these
//! wholesale every few seconds.

use std::collections::HashSet;

use axum::{extract::State, Extension, Json};
use chrono::{Datelike, Months, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Booking, BookingStatus, Claims, Property};

use super::{ApiResponse, AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalytics {
    pub total_revenue: f64,
    pub monthly_revenue: f64,
    pub pending_payments: f64,
    pub monthly_breakdown: Vec<MonthlyRevenue>,
    pub top_performing_properties: Vec<PropertyRevenue>,
}

#[derive(Serialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
}

#[derive(Serialize)]
pub struct PropertyRevenue {
    pub id: Uuid,
    pub title: String,
    pub revenue: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalytics {
    pub total_properties: usize,
    pub active_properties: usize,
    pub occupancy_rate: u32,
    pub average_rent: f64,
    pub property_performance: Vec<PropertyPerformance>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPerformance {
    pub id: Uuid,
    pub title: String,
    pub requests: usize,
    pub approved: usize,
    pub average_rating: Option<f64>,
}

#[derive(Serialize)]
pub struct Activity {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub timestamp: chrono::DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    pub active_tenants: usize,
    pub total_tenants: usize,
    pub tenants: Vec<TenantLease>,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantLease {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub property: String,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub monthly_rent: f64,
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingRenewal {
    pub tenant: String,
    pub property: String,
    pub renewal_date: NaiveDate,
    pub days_until_renewal: i64,
}

fn owner_bookings(
    state: &AppState,
    owner_id: Uuid,
) -> Result<Vec<(Property, Booking)>, ApiError> {
    let mut rows = Vec::new();
    for property in state.store.properties_by_owner(owner_id)? {
        for booking in state.store.bookings_by_property(property.id)? {
            rows.push((property.clone(), booking));
        }
    }
    Ok(rows)
}

fn lease_window(booking: &Booking) -> (NaiveDate, NaiveDate) {
    let start = booking
        .move_in_date
        .unwrap_or_else(|| booking.request_time.date_naive());
    let end = start
        .checked_add_months(Months::new(booking.duration_months))
        .unwrap_or(start);
    (start, end)
}

pub async fn financial(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<FinancialAnalytics>>, ApiError> {
    let now = Utc::now();
    let rows = owner_bookings(&state, claims.sub)?;

    let mut total_revenue = 0.0;
    let mut monthly_revenue = 0.0;
    let mut pending_payments = 0.0;
    for (property, booking) in &rows {
        match booking.status {
            BookingStatus::Approved => {
                total_revenue += property.rent * booking.duration_months as f64;
                if booking.response_time.map_or(false, |t| {
                    t.year() == now.year() && t.month() == now.month()
                }) {
                    monthly_revenue += property.rent;
                }
            }
            BookingStatus::Pending => pending_payments += property.rent,
            BookingStatus::Rejected => {}
        }
    }

    // Six-month breakdown of rent from bookings approved in each month.
    let today = now.date_naive();
    let mut monthly_breakdown = Vec::new();
    for back in (0..6u32).rev() {
        let month_start = today
            .with_day(1)
            .and_then(|d| d.checked_sub_months(Months::new(back)))
            .unwrap_or(today);
        let revenue = rows
            .iter()
            .filter(|(_, b)| b.status == BookingStatus::Approved)
            .filter(|(_, b)| {
                b.response_time.map_or(false, |t| {
                    t.year() == month_start.year() && t.month() == month_start.month()
                })
            })
            .map(|(p, _)| p.rent)
            .sum();
        monthly_breakdown.push(MonthlyRevenue {
            month: month_start.format("%b").to_string(),
            revenue,
        });
    }

    let mut top: Vec<PropertyRevenue> = state
        .store
        .properties_by_owner(claims.sub)?
        .into_iter()
        .map(|property| {
            let revenue = rows
                .iter()
                .filter(|(p, b)| p.id == property.id && b.status == BookingStatus::Approved)
                .map(|(p, b)| p.rent * b.duration_months as f64)
                .sum();
            PropertyRevenue {
                id: property.id,
                title: property.title,
                revenue,
            }
        })
        .collect();
    top.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    top.truncate(3);

    Ok(Json(ApiResponse::ok(
        "Financial analytics retrieved successfully",
        FinancialAnalytics {
            total_revenue,
            monthly_revenue,
            pending_payments,
            monthly_breakdown,
            top_performing_properties: top,
        },
    )))
}

pub async fn property_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<PropertyAnalytics>>, ApiError> {
    let properties = state.store.properties_by_owner(claims.sub)?;
    let total = properties.len();
    let active = properties.iter().filter(|p| p.is_available).count();
    let average_rent = if total == 0 {
        0.0
    } else {
        properties.iter().map(|p| p.rent).sum::<f64>() / total as f64
    };

    let mut occupied = 0;
    let mut performance = Vec::new();
    for property in properties {
        let bookings = state.store.bookings_by_property(property.id)?;
        let approved = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Approved)
            .count();
        if approved > 0 {
            occupied += 1;
        }
        let ratings = state.store.property_ratings_for(property.id)?;
        let average_rating = if ratings.is_empty() {
            None
        } else {
            let avg =
                ratings.iter().map(|r| r.rating as f64).sum::<f64>() / ratings.len() as f64;
            Some((avg * 10.0).round() / 10.0)
        };
        performance.push(PropertyPerformance {
            id: property.id,
            title: property.title,
            requests: bookings.len(),
            approved,
            average_rating,
        });
    }

    let occupancy_rate = if total == 0 {
        0
    } else {
        ((occupied as f64 / total as f64) * 100.0).round() as u32
    };

    Ok(Json(ApiResponse::ok(
        "Property analytics retrieved successfully",
        PropertyAnalytics {
            total_properties: total,
            active_properties: active,
            occupancy_rate,
            average_rent,
            property_performance: performance,
        },
    )))
}

pub async fn activities(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<Activity>>>, ApiError> {
    let mut feed = Vec::new();

    for (property, booking) in owner_bookings(&state, claims.sub)? {
        let tenant_name = state
            .store
            .user(booking.tenant_id)?
            .map(|u| u.name)
            .unwrap_or_else(|| "A tenant".to_string());
        match booking.status {
            BookingStatus::Pending => feed.push(Activity {
                id: booking.id,
                kind: "booking_request".to_string(),
                title: "New Booking Request".to_string(),
                description: format!(
                    "{tenant_name} requested to book {} for {} months",
                    property.title, booking.duration_months
                ),
                timestamp: booking.request_time,
            }),
            BookingStatus::Approved => {
                if let Some(at) = booking.response_time {
                    feed.push(Activity {
                        id: booking.id,
                        kind: "booking_approved".to_string(),
                        title: "Booking Approved".to_string(),
                        description: format!(
                            "{tenant_name}'s booking for {} was approved",
                            property.title
                        ),
                        timestamp: at,
                    });
                }
            }
            BookingStatus::Rejected => {
                if let Some(at) = booking.response_time {
                    feed.push(Activity {
                        id: booking.id,
                        kind: "booking_rejected".to_string(),
                        title: "Booking Rejected".to_string(),
                        description: format!(
                            "{tenant_name}'s booking for {} was rejected",
                            property.title
                        ),
                        timestamp: at,
                    });
                }
            }
        }
    }

    for property in state.store.properties_by_owner(claims.sub)? {
        if property.updated_at > property.created_at {
            feed.push(Activity {
                id: property.id,
                kind: "property_updated".to_string(),
                title: "Property Updated".to_string(),
                description: format!("Updated details for {}", property.title),
                timestamp: property.updated_at,
            });
        }
    }

    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(10);

    Ok(Json(ApiResponse::ok(
        "Recent activities retrieved successfully",
        feed,
    )))
}

pub async fn tenant_overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<TenantOverview>>, ApiError> {
    let today = Utc::now().date_naive();

    let mut tenants = Vec::new();
    let mut upcoming_renewals = Vec::new();
    let mut distinct = HashSet::new();
    let mut active = 0;

    for (property, booking) in owner_bookings(&state, claims.sub)? {
        if booking.status != BookingStatus::Approved {
            continue;
        }
        let tenant = match state.store.user(booking.tenant_id)? {
            Some(u) => u,
            None => continue,
        };
        distinct.insert(tenant.id);

        let (lease_start, lease_end) = lease_window(&booking);
        let is_active = today >= lease_start && today < lease_end;
        if is_active {
            active += 1;
        }

        let days_until_renewal = (lease_end - today).num_days();
        if (0..=60).contains(&days_until_renewal) {
            upcoming_renewals.push(UpcomingRenewal {
                tenant: tenant.name.clone(),
                property: property.title.clone(),
                renewal_date: lease_end,
                days_until_renewal,
            });
        }

        tenants.push(TenantLease {
            id: tenant.id,
            name: tenant.name,
            email: tenant.email,
            phone: tenant.phone,
            property: property.title,
            lease_start,
            lease_end,
            monthly_rent: property.rent,
            status: if is_active { "active" } else { "ended" }.to_string(),
        });
    }

    Ok(Json(ApiResponse::ok(
        "Tenant overview retrieved successfully",
        TenantOverview {
            active_tenants: active,
            total_tenants: distinct.len(),
            tenants,
            upcoming_renewals,
        },
    )))
}
