//! # Seed Data Generator
//!
//! Populates the database with a starter catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by DUKA_DATABASE_PATH (default ./duka.db)
//! cargo run -p duka-db --bin seed
//!
//! # Specify database path
//! cargo run -p duka-db --bin seed -- --db ./data/duka.db
//! ```
//!
//! ## Generated Data
//! - Delivery zones around the store (one free, two paid)
//! - Coupons: `WELCOME10` (10% once per customer), `SAVE100` (KES 100 off KES 500+)
//! - Spending brackets Bronze → Gold, plus an open-ended bracket for manual review
//! - A spin wheel with a "try again" slice and two stocked prizes
//!
//! Each section is skipped when the table already has rows, so the seed can
//! be re-run against an existing database.

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use duka_core::{
    Coordinate, Coupon, DeliveryZone, DiscountKind, SpendingBracket, SpinPrize, DEFAULT_TENANT_ID,
};
use duka_db::{Database, DbConfig, StoreConfig};

/// (name, km north of the store, km east of the store, radius, free, fee, minutes)
const ZONES: &[(&str, f64, f64, f64, bool, i64, i64)] = &[
    ("Nairobi CBD", 0.0, 0.0, 0.7, true, 0, 20),
    ("Westlands", 3.2, -2.1, 2.5, false, 15_000, 35),
    ("Kilimani", -1.8, -2.6, 2.0, false, 20_000, 40),
];

/// (label, min, max, reward)
const BRACKETS: &[(&str, i64, Option<i64>, i64)] = &[
    ("Bronze", 10_000, Some(30_000), 1_000),
    ("Silver", 30_100, Some(50_000), 2_000),
    ("Gold", 50_100, Some(100_000), 5_000),
    ("Customizable", 100_100, None, 0),
];

/// (label, weight, reward, stock)
const PRIZES: &[(&str, i64, i64, Option<i64>)] = &[
    ("Try again", 70, 0, None),
    ("KES 50 voucher", 25, 5_000, Some(100)),
    ("Free delivery", 5, 20_000, Some(10)),
];

const KM_PER_DEGREE: f64 = 111.32;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = StoreConfig::load()?;

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = store.database_path.clone();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Duka Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DUKA_DATABASE_PATH or ./duka.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Duka Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path.display());
    println!();

    let db = Database::new(DbConfig::new(db_path.clone())).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");
    println!();

    seed_zones(&db, store.store_location).await?;
    seed_coupons(&db).await?;
    seed_brackets(&db).await?;
    seed_prizes(&db).await?;

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

async fn seed_zones(db: &Database, store: Coordinate) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.zones().list_active().await?;
    if !existing.is_empty() {
        println!("⚠ {} delivery zones already present, skipping", existing.len());
        return Ok(());
    }

    let now = Utc::now();
    let lat_scale = store.latitude.to_radians().cos().max(0.01);
    let mut inserted = 0;

    for &(name, north_km, east_km, radius_km, free, fee, minutes) in ZONES {
        let zone = DeliveryZone {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: name.to_string(),
            center: Coordinate::new(
                store.latitude + north_km / KM_PER_DEGREE,
                store.longitude + east_km / (KM_PER_DEGREE * lat_scale),
            ),
            radius_km,
            free_delivery: free,
            fee,
            estimated_minutes: minutes,
            is_active: true,
            created_at: now,
        };

        if let Err(e) = db.zones().insert(&zone).await {
            eprintln!("Failed to insert zone {}: {}", name, e);
            continue;
        }
        inserted += 1;
    }

    println!("✓ Inserted {} delivery zones", inserted);
    Ok(())
}

async fn seed_coupons(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let coupons = [
        coupon("WELCOME10", "10% off your first order", DiscountKind::Percentage, 10, None, Some(1)),
        coupon("SAVE100", "KES 100 off orders over KES 500", DiscountKind::Fixed, 10_000, Some(50_000), None),
    ];

    let mut inserted = 0;
    for coupon in coupons {
        if db.coupons().get_by_code(&coupon.code).await?.is_some() {
            println!("⚠ Coupon {} already present, skipping", coupon.code);
            continue;
        }
        if let Err(e) = db.coupons().insert(&coupon).await {
            eprintln!("Failed to insert coupon {}: {}", coupon.code, e);
            continue;
        }
        inserted += 1;
    }

    println!("✓ Inserted {} coupons ({} active now)", inserted, db.coupons().list_active(now).await?.len());
    Ok(())
}

fn coupon(
    code: &str,
    description: &str,
    kind: DiscountKind,
    value: i64,
    min_order_amount: Option<i64>,
    max_uses_per_user: Option<i64>,
) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        code: code.to_string(),
        description: Some(description.to_string()),
        kind,
        value,
        min_order_amount,
        max_uses: None,
        max_uses_per_user,
        used_count: 0,
        starts_at: now - Duration::days(1),
        ends_at: now + Duration::days(90),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

async fn seed_brackets(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.rewards().list_brackets().await?;
    if !existing.is_empty() {
        println!("⚠ {} spending brackets already present, skipping", existing.len());
        return Ok(());
    }

    let mut inserted = 0;
    for &(label, min_spend, max_spend, reward_value) in BRACKETS {
        let bracket = SpendingBracket {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            label: label.to_string(),
            min_spend,
            max_spend,
            reward_value,
        };

        if let Err(e) = db.rewards().insert_bracket(&bracket).await {
            eprintln!("Failed to insert bracket {}: {}", label, e);
            continue;
        }
        inserted += 1;
    }

    println!("✓ Inserted {} spending brackets", inserted);
    Ok(())
}

async fn seed_prizes(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.spins().list_prizes().await?;
    if !existing.is_empty() {
        println!("⚠ {} spin prizes already present, skipping", existing.len());
        return Ok(());
    }

    let mut inserted = 0;
    for &(label, weight, reward_value, stock_remaining) in PRIZES {
        let prize = SpinPrize {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            label: label.to_string(),
            weight,
            reward_value,
            stock_remaining,
            is_active: true,
        };

        if let Err(e) = db.spins().insert_prize(&prize).await {
            eprintln!("Failed to insert prize {}: {}", label, e);
            continue;
        }
        inserted += 1;
    }

    println!("✓ Inserted {} spin prizes", inserted);
    Ok(())
}
