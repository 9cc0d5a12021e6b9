//! Router-level tests driving the real handlers through tower's oneshot.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::{create_router, AppState};
use crate::auth::{create_jwt, hash_password};
use crate::chatbot::Chatbot;
use crate::config::Config;
use crate::email::Mailer;
use crate::models::{Property, PropertyType, Role, User};
use crate::storage::Store;

const TEST_SECRET: &str = "test-secret";

fn test_app(name: &str) -> (Router, AppState, PathBuf) {
    let dir = std::env::temp_dir().join(format!("house_rental_test_api_{name}"));
    let _ = fs::remove_dir_all(&dir);
    let store = Store::open(dir.to_str().unwrap()).expect("open store");
    let config = Config {
        port: 0,
        data_dir: dir.to_str().unwrap().to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        app_url: "http://localhost:4200".to_string(),
        smtp: None,
        email_from: "noreply@test.local".to_string(),
        email_from_name: "Test".to_string(),
        openrouter_api_key: None,
    };
    let state = AppState {
        store,
        config: Arc::new(config),
        mailer: Arc::new(Mailer::disabled()),
        chatbot: Arc::new(Chatbot::new(None)),
    };
    (create_router(state.clone()), state, dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register through the API; returns (token, user id).
async fn register(app: &Router, email: &str, role: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "password1",
            "name": format!("{role} {email}"),
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["data"]["token"].as_str().unwrap().to_string(),
        body["data"]["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn create_property(app: &Router, owner_token: &str, title: &str, rent: f64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/properties",
        Some(owner_token),
        Some(json!({
            "title": title,
            "location": "Test Town",
            "rent": rent,
            "bedrooms": 2,
            "amenities": ["WiFi"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create property failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_booking(app: &Router, tenant_token: &str, property_id: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/bookings",
        Some(tenant_token),
        Some(json!({ "property_id": property_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create booking failed: {body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Admins cannot be created through the API; write one straight to the store
/// the way the seed binary does.
fn seed_admin(state: &AppState) -> String {
    let now = Utc::now();
    let admin = User {
        id: Uuid::new_v4(),
        email: "admin@test.local".to_string(),
        password_hash: hash_password("admin123").unwrap(),
        name: "System Admin".to_string(),
        phone: None,
        role: Role::Admin,
        avatar: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_user(&admin).unwrap();
    create_jwt(&admin, TEST_SECRET).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_running() {
    let (app, _state, dir) = test_app("health");

    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("API is running"));

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn register_login_and_profile_flow() {
    let (app, _state, dir) = test_app("auth_flow");

    let (_, _) = register(&app, "jane@example.com", "owner").await;

    // Duplicate email is a validation failure.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "jane@example.com",
            "password": "password1",
            "name": "Jane Again",
            "role": "tenant",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Email already registered"));

    // Admin registration is rejected.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "boss@example.com",
            "password": "password1",
            "name": "Boss",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Login with wrong password.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "jane@example.com", "password": "nope!!" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Login, then fetch and update the profile.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "jane@example.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["user"].get("password_hash").is_none());

    let (status, body) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("jane@example.com"));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({ "phone": "+1-555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], json!("+1-555-0100"));

    // Missing and garbage tokens are both 401.
    let (status, _) = send(&app, Method::GET, "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, "/api/auth/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn booking_lifecycle_approval_and_rating() {
    let (app, _state, dir) = test_app("lifecycle");

    let (owner_token, owner_id) = register(&app, "owner@example.com", "owner").await;
    let (tenant_token, _) = register(&app, "tenant@example.com", "tenant").await;
    let (intruder_token, _) = register(&app, "intruder@example.com", "owner").await;

    let property_id = create_property(&app, &owner_token, "Lifecycle Flat", 2000.0).await;
    let booking_id = create_booking(&app, &tenant_token, &property_id).await;

    // Second Pending request for the same pair is rejected.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&tenant_token),
        Some(json!({ "property_id": property_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("You already have a pending booking request for this property")
    );

    // Only the owning owner (or admin) may transition the booking.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking_id}/status"),
        Some(&intruder_token),
        Some(json!({ "status": "Approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Invalid status value is a validation failure.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking_id}/status"),
        Some(&owner_token),
        Some(json!({ "status": "Maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Owner approves: status flips, response_time is stamped.
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking_id}/status"),
        Some(&owner_token),
        Some(json!({ "status": "Approved", "owner_notes": "Welcome!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("Approved"));
    assert!(!body["data"]["response_time"].is_null());
    assert_eq!(body["data"]["owner_notes"], json!("Welcome!"));

    // Tenant rates the property 4, then changes their mind to 2: the average
    // follows and the count stays at one.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/property",
        Some(&tenant_token),
        Some(json!({ "propertyId": property_id, "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/ratings/property/{property_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["summary"]["average_rating"], json!("4.0"));
    assert_eq!(body["data"]["summary"]["rating_count"], json!(1));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/property",
        Some(&tenant_token),
        Some(json!({ "propertyId": property_id, "rating": 2, "comment": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/ratings/property/{property_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["summary"]["average_rating"], json!("2.0"));
    assert_eq!(body["data"]["summary"]["rating_count"], json!(1));
    assert_eq!(body["data"]["reviews"].as_array().unwrap().len(), 1);

    // The approved booking also lets the tenant rate the owner.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/user",
        Some(&tenant_token),
        Some(json!({ "targetUserId": owner_id, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/ratings/user/{owner_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["data"]["summary"]["rating_count"], json!(1));
    assert_eq!(body["data"]["summary"]["average_rating"], json!("5.0"));

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn tenant_cannot_book_their_own_property() {
    let (app, state, dir) = test_app("own_property");

    let (tenant_token, tenant_id) = register(&app, "landlady@example.com", "tenant").await;

    // Property owned by the very same user, written directly to the store
    // (the API would never let a tenant list one).
    let now = Utc::now();
    let property = Property {
        id: Uuid::new_v4(),
        owner_id: tenant_id.parse().unwrap(),
        title: "My Own Place".to_string(),
        description: None,
        rent: 900.0,
        location: "Home".to_string(),
        amenities: vec![],
        photos: vec![],
        bedrooms: 1,
        bathrooms: 1,
        area_sqft: None,
        property_type: PropertyType::Studio,
        is_available: true,
        created_at: now,
        updated_at: now,
    };
    state.store.create_property(&property).unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&tenant_token),
        Some(json!({ "property_id": property.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("You cannot book your own property"));

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn booking_rejects_missing_or_unavailable_property() {
    let (app, _state, dir) = test_app("unavailable");

    let (owner_token, _) = register(&app, "o3@example.com", "owner").await;
    let (tenant_token, _) = register(&app, "t3@example.com", "tenant").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&tenant_token),
        Some(json!({ "property_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let property_id = create_property(&app, &owner_token, "Soon Gone", 1000.0).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/properties/{property_id}"),
        Some(&owner_token),
        Some(json!({ "is_available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&tenant_token),
        Some(json!({ "property_id": property_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Property is not available for booking")
    );

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn cancel_only_while_pending_and_only_by_its_tenant() {
    let (app, _state, dir) = test_app("cancel");

    let (owner_token, _) = register(&app, "o4@example.com", "owner").await;
    let (tenant_token, _) = register(&app, "t4@example.com", "tenant").await;
    let (other_tenant_token, _) = register(&app, "t5@example.com", "tenant").await;

    let property_id = create_property(&app, &owner_token, "Cancelled Flat", 1200.0).await;
    let booking_id = create_booking(&app, &tenant_token, &property_id).await;

    // A different tenant cannot cancel it.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/bookings/{booking_id}"),
        Some(&other_tenant_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Once approved, cancellation is no longer possible.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{booking_id}/status"),
        Some(&owner_token),
        Some(json!({ "status": "Approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/bookings/{booking_id}"),
        Some(&tenant_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Only pending bookings can be cancelled")
    );

    // A fresh Pending booking on another property cancels fine.
    let property2 = create_property(&app, &owner_token, "Second Flat", 1300.0).await;
    let booking2 = create_booking(&app, &tenant_token, &property2).await;
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/bookings/{booking2}"),
        Some(&tenant_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/bookings/my-bookings",
        Some(&tenant_token),
        None,
    )
    .await;
    let remaining: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert!(remaining.contains(&booking_id.as_str()));
    assert!(!remaining.contains(&booking2.as_str()));

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn rating_requires_an_approved_booking() {
    let (app, _state, dir) = test_app("rating_gate");

    let (owner_token, owner_id) = register(&app, "o6@example.com", "owner").await;
    let (tenant_token, tenant_id) = register(&app, "t6@example.com", "tenant").await;

    let property_id = create_property(&app, &owner_token, "Unrated Flat", 1500.0).await;
    create_booking(&app, &tenant_token, &property_id).await;

    // Pending is not enough.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/property",
        Some(&tenant_token),
        Some(json!({ "propertyId": property_id, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/user",
        Some(&tenant_token),
        Some(json!({ "targetUserId": owner_id, "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Out-of-range and self ratings are validation failures.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/ratings/property",
        Some(&tenant_token),
        Some(json!({ "propertyId": property_id, "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ratings/user",
        Some(&tenant_token),
        Some(json!({ "targetUserId": tenant_id, "rating": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("You cannot rate yourself."));

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn owner_dashboard_counts_and_stats() {
    let (app, _state, dir) = test_app("dashboard");

    let (owner_token, _) = register(&app, "o7@example.com", "owner").await;
    let (t1, _) = register(&app, "t7@example.com", "tenant").await;
    let (t2, _) = register(&app, "t8@example.com", "tenant").await;

    let p1 = create_property(&app, &owner_token, "Flat One", 1000.0).await;
    let _p2 = create_property(&app, &owner_token, "Flat Two", 2000.0).await;

    let b1 = create_booking(&app, &t1, &p1).await;
    create_booking(&app, &t2, &p1).await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{b1}/status"),
        Some(&owner_token),
        Some(json!({ "status": "Approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/properties/owner/my-properties",
        Some(&owner_token),
        None,
    )
    .await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    let flat_one = rows
        .iter()
        .find(|r| r["title"] == json!("Flat One"))
        .unwrap();
    assert_eq!(flat_one["pending_requests"], json!(1));
    assert_eq!(flat_one["approved_bookings"], json!(1));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/bookings/stats",
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(body["data"]["total_properties"], json!(2));
    assert_eq!(body["data"]["total_requests"], json!(2));
    assert_eq!(body["data"]["pending_requests"], json!(1));
    assert_eq!(body["data"]["approved_bookings"], json!(1));

    // Owner request listing is gated away from tenants.
    let (status, _) = send(&app, Method::GET, "/api/bookings/requests", Some(&t1), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn admin_oversight_and_role_gate() {
    let (app, state, dir) = test_app("admin");

    let admin_token = seed_admin(&state);
    let (owner_token, _) = register(&app, "o9@example.com", "owner").await;
    let (tenant_token, tenant_id) = register(&app, "t9@example.com", "tenant").await;

    let property_id = create_property(&app, &owner_token, "Overseen Flat", 1800.0).await;
    create_booking(&app, &tenant_token, &property_id).await;

    // Non-admins are turned away.
    let (status, _) = send(&app, Method::GET, "/api/admin/stats", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/api/admin/stats", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalUsers"], json!(3));
    assert_eq!(body["data"]["totalProperties"], json!(1));
    assert_eq!(body["data"]["totalBookings"], json!(1));
    assert_eq!(body["data"]["activeListings"], json!(1));

    let (_, body) = send(&app, Method::GET, "/api/admin/users", Some(&admin_token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/admin/properties",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Role override.
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/users/{tenant_id}/role"),
        Some(&admin_token),
        Some(json!({ "role": "owner" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("owner"));

    // Deleting the property cascades away its booking.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/properties/{property_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store.bookings().unwrap().is_empty());

    // An admin cannot delete themselves.
    let admin_id = state
        .store
        .user_by_email("admin@test.local")
        .unwrap()
        .unwrap()
        .id;
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/users/{admin_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn property_search_filters_and_pagination() {
    let (app, _state, dir) = test_app("search");

    let (owner_token, _) = register(&app, "o10@example.com", "owner").await;
    create_property(&app, &owner_token, "Cheap Studio Downtown", 700.0).await;
    create_property(&app, &owner_token, "Mid Flat Suburb", 1500.0).await;
    let hidden = create_property(&app, &owner_token, "Hidden Villa", 4000.0).await;

    // Take one listing off the market.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/properties/{hidden}"),
        Some(&owner_token),
        Some(json!({ "is_available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/properties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], json!(2));
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert!(!titles.contains(&"Hidden Villa"));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/properties?minRent=1000",
        None,
        None,
    )
    .await;
    assert_eq!(body["pagination"]["total"], json!(1));
    assert_eq!(body["data"][0]["title"], json!("Mid Flat Suburb"));

    let (_, body) = send(
        &app,
        Method::GET,
        "/api/properties?title=studio",
        None,
        None,
    )
    .await;
    assert_eq!(body["pagination"]["total"], json!(1));
    assert_eq!(body["data"][0]["title"], json!("Cheap Studio Downtown"));

    let (_, body) = send(&app, Method::GET, "/api/properties?limit=1&page=2", None, None).await;
    assert_eq!(body["pagination"]["total"], json!(2));
    assert_eq!(body["pagination"]["totalPages"], json!(2));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let _ = fs::remove_dir_all(dir);
}

#[tokio::test]
async fn chatbot_is_gated_and_degrades_gracefully() {
    let (app, state, dir) = test_app("chatbot");

    let admin_token = seed_admin(&state);
    let (tenant_token, _) = register(&app, "t11@example.com", "tenant").await;

    // Empty messages are rejected.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/chatbot/message",
        Some(&tenant_token),
        Some(json!({ "message": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admins have no chatbot.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/chatbot/message",
        Some(&admin_token),
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Without an API key the request still succeeds with a fallback reply.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/chatbot/message",
        Some(&tenant_token),
        Some(json!({ "message": "why is my booking pending?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["response"]
        .as_str()
        .unwrap()
        .contains("not configured"));

    let _ = fs::remove_dir_all(dir);
}
