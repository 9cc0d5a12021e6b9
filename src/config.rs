//! Environment-driven configuration.
//!
//! Values come from the process environment (a `.env` file is loaded by the
//! binaries via dotenvy before this runs). Missing optional services (SMTP,
//! chatbot key) disable the corresponding side channel rather than failing
//! startup.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub jwt_secret: String,
    /// Base URL of the SPA, used for links inside notification emails.
    pub app_url: String,
    pub smtp: Option<SmtpConfig>,
    pub email_from: String,
    pub email_from_name: String,
    pub openrouter_api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3001"),
            data_dir: try_load("DATA_DIR", "rental_data"),
            jwt_secret: try_load("JWT_SECRET", "dev-secret-change-me"),
            app_url: try_load("APP_URL", "http://localhost:4200"),
            smtp: SmtpConfig::load(),
            email_from: try_load("EMAIL_FROM", "noreply@houserental.local"),
            email_from_name: try_load("EMAIL_FROM_NAME", "House Rental System"),
            openrouter_api_key: opt("OPENROUTER_API_KEY"),
        }
    }
}

impl SmtpConfig {
    fn load() -> Option<Self> {
        let host = match opt("SMTP_HOST") {
            Some(h) => h,
            None => {
                warn!("SMTP_HOST not set, email notifications disabled");
                return None;
            }
        };
        Some(Self {
            host,
            port: try_load("SMTP_PORT", "587"),
            user: try_load("SMTP_USER", ""),
            pass: try_load("SMTP_PASS", ""),
        })
    }
}

fn opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
