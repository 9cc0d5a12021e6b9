use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;

const TOKEN_FILE: &str = ".rental_token";

#[derive(Parser)]
#[command(name = "rental-cli")]
#[command(about = "CLI for the House Rental API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "tenant")]
        role: String,
    },
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    Profile,
    Properties {
        #[arg(short, long)]
        location: Option<String>,
        #[arg(long)]
        min_rent: Option<f64>,
        #[arg(long)]
        max_rent: Option<f64>,
    },
    AddProperty {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        location: String,
        #[arg(short, long)]
        rent: f64,
        #[arg(short, long, default_value_t = 1)]
        bedrooms: u32,
        #[arg(short = 'd', long)]
        description: Option<String>,
    },
    Book {
        #[arg(short, long)]
        property_id: String,
        #[arg(short, long)]
        message: Option<String>,
        #[arg(short = 'n', long, default_value_t = 12)]
        months: u32,
    },
    MyBookings,
    Requests,
    Respond {
        #[arg(short, long)]
        id: String,
        /// Approved or Rejected
        #[arg(short, long)]
        status: String,
        #[arg(short, long)]
        notes: Option<String>,
    },
    Cancel {
        #[arg(short, long)]
        id: String,
    },
    RateProperty {
        #[arg(short, long)]
        property_id: String,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    Stats,
    Logout,
}

fn token() -> String {
    fs::read_to_string(TOKEN_FILE).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Register {
            email,
            password,
            name,
            role,
        } => {
            let res = client
                .post(format!("{}/api/auth/register", cli.url))
                .json(&json!({
                    "email": email,
                    "password": password,
                    "name": name,
                    "role": role,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            if res.status().is_success() {
                let body: Value = res.json().await?;
                match body["data"]["token"].as_str() {
                    Some(token) => {
                        fs::write(TOKEN_FILE, token)?;
                        println!("Logged in. Token saved to {TOKEN_FILE}");
                    }
                    None => println!("Login response missing token: {body}"),
                }
            } else {
                println!("Login failed: {}", res.text().await?);
            }
        }
        Commands::Profile => {
            let res = client
                .get(format!("{}/api/auth/profile", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Properties {
            location,
            min_rent,
            max_rent,
        } => {
            let mut query: Vec<(String, String)> = Vec::new();
            if let Some(location) = location {
                query.push(("location".to_string(), location));
            }
            if let Some(min) = min_rent {
                query.push(("minRent".to_string(), min.to_string()));
            }
            if let Some(max) = max_rent {
                query.push(("maxRent".to_string(), max.to_string()));
            }
            let res = client
                .get(format!("{}/api/properties", cli.url))
                .query(&query)
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::AddProperty {
            title,
            location,
            rent,
            bedrooms,
            description,
        } => {
            let res = client
                .post(format!("{}/api/properties", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({
                    "title": title,
                    "location": location,
                    "rent": rent,
                    "bedrooms": bedrooms,
                    "description": description,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Book {
            property_id,
            message,
            months,
        } => {
            let res = client
                .post(format!("{}/api/bookings", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({
                    "property_id": property_id,
                    "message": message,
                    "duration_months": months,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::MyBookings => {
            let res = client
                .get(format!("{}/api/bookings/my-bookings", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Requests => {
            let res = client
                .get(format!("{}/api/bookings/requests", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Respond { id, status, notes } => {
            let res = client
                .patch(format!("{}/api/bookings/{}/status", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({ "status": status, "owner_notes": notes }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Cancel { id } => {
            let res = client
                .delete(format!("{}/api/bookings/{}", cli.url, id))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::RateProperty {
            property_id,
            rating,
            comment,
        } => {
            let res = client
                .post(format!("{}/api/ratings/property", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .json(&json!({
                    "propertyId": property_id,
                    "rating": rating,
                    "comment": comment,
                }))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Stats => {
            let res = client
                .get(format!("{}/api/bookings/stats", cli.url))
                .header("Authorization", format!("Bearer {}", token()))
                .send()
                .await?;
            println!("Response: {}", res.text().await?);
        }
        Commands::Logout => {
            let _ = fs::remove_file(TOKEN_FILE);
            println!("Logged out (token removed).");
        }
    }

    Ok(())
}
