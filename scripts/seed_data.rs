//! Seed script for the House Rental API.
//!
//! Bootstraps the storage with a default admin account plus a sample owner,
//! tenant and a few listings, so the API is immediately usable.
//! Run: cargo run --bin seed_data

use chrono::Utc;
use uuid::Uuid;

use house_rental::auth::hash_password;
use house_rental::config::Config;
use house_rental::models::{Property, PropertyType, Role, User};
use house_rental::storage::Store;

fn user(email: &str, password: &str, name: &str, role: Role) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(password).expect("bcrypt hash"),
        name: name.to_string(),
        phone: None,
        role,
        avatar: None,
        created_at: now,
        updated_at: now,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::load();
    let store = Store::open(&config.data_dir)?;

    // Idempotent: re-running against an existing database changes nothing.
    if store.user_by_email("admin@houserental.com")?.is_some() {
        println!("Database already seeded, nothing to do.");
        return Ok(());
    }

    let admin = user("admin@houserental.com", "admin123", "System Admin", Role::Admin);
    store.create_user(&admin)?;

    let owner = user("owner@houserental.com", "owner123", "Sarah Johnson", Role::Owner);
    store.create_user(&owner)?;

    let tenant = user("tenant@houserental.com", "tenant123", "Mike Chen", Role::Tenant);
    store.create_user(&tenant)?;

    let now = Utc::now();
    let listings = [
        Property {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: "Modern Downtown Apartment".to_string(),
            description: Some(
                "Beautiful 2-bedroom apartment in the heart of downtown with stunning city views."
                    .to_string(),
            ),
            rent: 2500.0,
            location: "Downtown, City Center".to_string(),
            amenities: ["WiFi", "Parking", "Gym", "Pool"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            photos: vec![
                "https://images.unsplash.com/photo-1545324418-cc1a3fa10c00?w=800".to_string(),
            ],
            bedrooms: 2,
            bathrooms: 2,
            area_sqft: Some(1200),
            property_type: PropertyType::Apartment,
            is_available: true,
            created_at: now,
            updated_at: now,
        },
        Property {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: "Cozy Studio Near University".to_string(),
            description: Some(
                "Perfect for students - close to university with all amenities nearby.".to_string(),
            ),
            rent: 1200.0,
            location: "University District".to_string(),
            amenities: ["WiFi", "Laundry", "Study Area"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            photos: vec![
                "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800".to_string(),
            ],
            bedrooms: 1,
            bathrooms: 1,
            area_sqft: Some(600),
            property_type: PropertyType::Studio,
            is_available: true,
            created_at: now,
            updated_at: now,
        },
        Property {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: "Luxury Villa with Garden".to_string(),
            description: Some(
                "Spacious 4-bedroom villa with private garden and modern amenities.".to_string(),
            ),
            rent: 4500.0,
            location: "Suburban Area".to_string(),
            amenities: ["WiFi", "Parking", "Garden", "Security", "Pool"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            photos: vec![
                "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800".to_string(),
            ],
            bedrooms: 4,
            bathrooms: 3,
            area_sqft: Some(2500),
            property_type: PropertyType::Villa,
            is_available: true,
            created_at: now,
            updated_at: now,
        },
    ];
    for listing in &listings {
        store.create_property(listing)?;
    }

    println!("✅ Database seeded at {}", config.data_dir);
    println!("👤 Admin:  admin@houserental.com / admin123");
    println!("👤 Owner:  owner@houserental.com / owner123 ({} listings)", listings.len());
    println!("👤 Tenant: tenant@houserental.com / tenant123");

    Ok(())
}
