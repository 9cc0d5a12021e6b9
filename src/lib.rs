//! Online house rental & tenant management system — REST backend.
//!
//! Tenants browse and book listings, owners manage properties and respond to
//! booking requests, admins oversee users/properties/bookings. Modular
//! stack: Sled-backed storage, Axum HTTP layer with JWT bearer auth, SMTP
//! notification side channel, and a stateless LLM chatbot proxy.

pub mod auth;
pub mod chatbot;
pub mod config;
pub mod email;
pub mod error;
pub mod models;
pub mod rest;
pub mod storage;
