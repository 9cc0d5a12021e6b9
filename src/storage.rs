//! Persistent store for the rental marketplace.
//!
//! Sled KV with one tree per table (users, properties, bookings,
//! property_ratings, user_ratings); entities are Serde-serialized JSON
//! values keyed by UUID. The relational constraints of the schema live
//! here: rating trees use composite `subject/author` keys, which makes the
//! one-rating-per-pair invariant a property of the key space and turns
//! resubmission into an upsert; deletes cascade through dependent rows the
//! way the SQL foreign keys would.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Property, PropertyRating, User, UserRating};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[allow(dead_code)] // db kept for flush/size ops on Sled
#[derive(Clone)]
pub struct Store {
    db: Db,
    users: sled::Tree,
    properties: sled::Tree,
    bookings: sled::Tree,
    property_ratings: sled::Tree,
    user_ratings: sled::Tree,
}

impl Store {
    /// Open or create the database at the given path and its per-table trees.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let users = db.open_tree("users")?;
        let properties = db.open_tree("properties")?;
        let bookings = db.open_tree("bookings")?;
        let property_ratings = db.open_tree("property_ratings")?;
        let user_ratings = db.open_tree("user_ratings")?;
        Ok(Self {
            db,
            users,
            properties,
            bookings,
            property_ratings,
            user_ratings,
        })
    }

    // --- Users ---

    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        put(&self.users, user.id.as_bytes(), user)
    }

    pub fn user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        get(&self.users, id.as_bytes())
    }

    /// Email lookup, case-insensitive like the unique column it stands for.
    pub fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        for user in scan::<User>(&self.users)? {
            if user.email.eq_ignore_ascii_case(email) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    pub fn update_user(&self, user: &User) -> Result<(), StoreError> {
        put(&self.users, user.id.as_bytes(), user)
    }

    pub fn users(&self) -> Result<Vec<User>, StoreError> {
        scan(&self.users)
    }

    /// Delete a user and everything hanging off them: owned properties (with
    /// their bookings and ratings), bookings made as tenant, and user ratings
    /// given or received.
    pub fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        for property in self.properties_by_owner(id)? {
            self.delete_property(property.id)?;
        }
        for booking in self.bookings_by_tenant(id)? {
            self.bookings.remove(booking.id.as_bytes())?;
        }
        for rating in scan::<PropertyRating>(&self.property_ratings)? {
            if rating.tenant_id == id {
                self.property_ratings
                    .remove(pair_key(rating.property_id, rating.tenant_id))?;
            }
        }
        for rating in scan::<UserRating>(&self.user_ratings)? {
            if rating.reviewer_id == id || rating.target_user_id == id {
                self.user_ratings
                    .remove(pair_key(rating.target_user_id, rating.reviewer_id))?;
            }
        }
        self.users.remove(id.as_bytes())?;
        Ok(())
    }

    // --- Properties ---

    pub fn create_property(&self, property: &Property) -> Result<(), StoreError> {
        put(&self.properties, property.id.as_bytes(), property)
    }

    pub fn property(&self, id: Uuid) -> Result<Option<Property>, StoreError> {
        get(&self.properties, id.as_bytes())
    }

    pub fn update_property(&self, property: &Property) -> Result<(), StoreError> {
        put(&self.properties, property.id.as_bytes(), property)
    }

    pub fn properties(&self) -> Result<Vec<Property>, StoreError> {
        scan(&self.properties)
    }

    pub fn properties_by_owner(&self, owner_id: Uuid) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .properties()?
            .into_iter()
            .filter(|p| p.owner_id == owner_id)
            .collect())
    }

    /// Delete a property together with its bookings and ratings.
    pub fn delete_property(&self, id: Uuid) -> Result<(), StoreError> {
        for booking in self.bookings_by_property(id)? {
            self.bookings.remove(booking.id.as_bytes())?;
        }
        for item in self.property_ratings.scan_prefix(id.to_string().as_bytes()) {
            let (key, _) = item?;
            self.property_ratings.remove(key)?;
        }
        self.properties.remove(id.as_bytes())?;
        Ok(())
    }

    // --- Bookings ---

    pub fn create_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        put(&self.bookings, booking.id.as_bytes(), booking)
    }

    pub fn booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        get(&self.bookings, id.as_bytes())
    }

    pub fn update_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        put(&self.bookings, booking.id.as_bytes(), booking)
    }

    pub fn delete_booking(&self, id: Uuid) -> Result<(), StoreError> {
        self.bookings.remove(id.as_bytes())?;
        Ok(())
    }

    pub fn bookings(&self) -> Result<Vec<Booking>, StoreError> {
        scan(&self.bookings)
    }

    pub fn bookings_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings()?
            .into_iter()
            .filter(|b| b.tenant_id == tenant_id)
            .collect())
    }

    pub fn bookings_by_property(&self, property_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings()?
            .into_iter()
            .filter(|b| b.property_id == property_id)
            .collect())
    }

    /// Existence check backing the one-Pending-request-per-pair rule.
    /// Read-then-write at the caller; the race window is a known, accepted
    /// gap of this schema.
    pub fn has_pending_booking(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(self.bookings()?.iter().any(|b| {
            b.property_id == property_id
                && b.tenant_id == tenant_id
                && b.status == BookingStatus::Pending
        }))
    }

    /// Gate for property ratings: the tenant must hold an Approved booking
    /// on the property.
    pub fn has_approved_booking(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<bool, StoreError> {
        Ok(self.bookings()?.iter().any(|b| {
            b.property_id == property_id
                && b.tenant_id == tenant_id
                && b.status == BookingStatus::Approved
        }))
    }

    /// Gate for user ratings: an Approved booking must link the two users in
    /// either direction (one as tenant, the other as the property's owner).
    pub fn users_share_approved_booking(&self, a: Uuid, b: Uuid) -> Result<bool, StoreError> {
        for booking in self.bookings()? {
            if booking.status != BookingStatus::Approved {
                continue;
            }
            let owner_id = match self.property(booking.property_id)? {
                Some(p) => p.owner_id,
                None => continue,
            };
            if (booking.tenant_id == a && owner_id == b)
                || (booking.tenant_id == b && owner_id == a)
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // --- Ratings ---

    /// Insert-or-update on the (property, tenant) key; a resubmission keeps
    /// the original row identity and creation time.
    pub fn upsert_property_rating(
        &self,
        property_id: Uuid,
        tenant_id: Uuid,
        rating: u8,
        comment: Option<String>,
    ) -> Result<PropertyRating, StoreError> {
        let key = pair_key(property_id, tenant_id);
        let now = Utc::now();
        let row = match get::<PropertyRating>(&self.property_ratings, &key)? {
            Some(existing) => PropertyRating {
                rating,
                comment,
                updated_at: now,
                ..existing
            },
            None => PropertyRating {
                id: Uuid::new_v4(),
                property_id,
                tenant_id,
                rating,
                comment,
                created_at: now,
                updated_at: now,
            },
        };
        put(&self.property_ratings, &key, &row)?;
        Ok(row)
    }

    pub fn property_ratings_for(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<PropertyRating>, StoreError> {
        let mut out = Vec::new();
        for item in self
            .property_ratings
            .scan_prefix(property_id.to_string().as_bytes())
        {
            let (_, value) = item?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }

    /// Insert-or-update on the (reviewer, target) key.
    pub fn upsert_user_rating(
        &self,
        reviewer_id: Uuid,
        target_user_id: Uuid,
        rating: u8,
        comment: Option<String>,
    ) -> Result<UserRating, StoreError> {
        let key = pair_key(target_user_id, reviewer_id);
        let now = Utc::now();
        let row = match get::<UserRating>(&self.user_ratings, &key)? {
            Some(existing) => UserRating {
                rating,
                comment,
                updated_at: now,
                ..existing
            },
            None => UserRating {
                id: Uuid::new_v4(),
                reviewer_id,
                target_user_id,
                rating,
                comment,
                created_at: now,
                updated_at: now,
            },
        };
        put(&self.user_ratings, &key, &row)?;
        Ok(row)
    }

    pub fn user_ratings_for(&self, target_user_id: Uuid) -> Result<Vec<UserRating>, StoreError> {
        let mut out = Vec::new();
        for item in self
            .user_ratings
            .scan_prefix(target_user_id.to_string().as_bytes())
        {
            let (_, value) = item?;
            out.push(serde_json::from_slice(&value)?);
        }
        Ok(out)
    }
}

/// Composite key for the rating trees. The leading id is the one reads are
/// grouped by (property for property ratings, target user for user ratings).
fn pair_key(group_id: Uuid, author_id: Uuid) -> Vec<u8> {
    format!("{group_id}/{author_id}").into_bytes()
}

fn put<T: Serialize>(tree: &sled::Tree, key: &[u8], value: &T) -> Result<(), StoreError> {
    tree.insert(key, serde_json::to_vec(value)?)?;
    Ok(())
}

fn get<T: DeserializeOwned>(tree: &sled::Tree, key: &[u8]) -> Result<Option<T>, StoreError> {
    match tree.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
        None => Ok(None),
    }
}

fn scan<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for item in tree.iter() {
        let (_, value) = item?;
        out.push(serde_json::from_slice(&value)?);
    }
    Ok(out)
}
