use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Tenant,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Owner => "owner",
            Role::Tenant => "tenant",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Studio,
    Villa,
    Condo,
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Apartment
    }
}

/// Booking lifecycle. Pending is the only non-terminal state; a Pending
/// booking may also be cancelled (deleted) by its tenant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Serializable view without the password hash. Handlers must never
    /// return the stored `User` directly.
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub rent: f64,
    pub location: String,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: Option<u32>,
    pub property_type: PropertyType,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub status: BookingStatus,
    pub message: Option<String>,
    pub move_in_date: Option<NaiveDate>,
    pub duration_months: u32,
    pub request_time: DateTime<Utc>,
    pub response_time: Option<DateTime<Utc>>,
    pub owner_notes: Option<String>,
}

/// One rating per (property, tenant) pair; resubmission overwrites.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PropertyRating {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One rating per (reviewer, target) pair; resubmission overwrites.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRating {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub target_user_id: Uuid,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// JWT payload carried in the Authorization header and attached to requests
/// by the auth middleware.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
