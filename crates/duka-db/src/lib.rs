//! # duka-db: Persistence Layer for Duka
//!
//! This crate stores delivery zones, coupons, reward brackets, spin prizes
//! and verification codes. It uses SQLite through sqlx, with an optional
//! Redis store for verification codes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka Data Flow                                   │
//! │                                                                         │
//! │  Checkout / order-completion handler                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CouponRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ZoneRepo      │    │ 001_init.sql │  │   │
//! │  │   │ WAL, busy     │    │ RewardRepo    │    │              │  │   │
//! │  │   │ timeout       │    │ SpinRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────────────────────────────────────────────┐    │   │
//! │  │   │ VerificationStore: SQLite table │ Redis (feature)     │    │   │
//! │  │   └───────────────────────────────────────────────────────┘    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   duka-core: fee, coupon, reward and spin rules (pure)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`config`] - Store configuration from the environment
//! - [`repository`] - Repository implementations (coupon, zone, reward, spin)
//! - [`verification`] - Phone verification code stores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_db::{Database, DbConfig, RedeemCoupon};
//!
//! let db = Database::new(DbConfig::new("path/to/duka.db")).await?;
//!
//! let redemption = db.coupons().redeem(&RedeemCoupon {
//!     code: "WELCOME10".into(),
//!     user_id: "user-1".into(),
//!     order_id: "order-1".into(),
//!     order_amount: Money::from_minor(100_000),
//! }).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod verification;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::coupon::{CouponRepository, RedeemCoupon, Redemption};
pub use repository::reward::{RewardEvent, RewardRepository};
pub use repository::spin::{SpinOutcome, SpinRepository};
pub use repository::zone::ZoneRepository;

pub use verification::sqlite::SqliteVerificationStore;
pub use verification::VerificationStore;

#[cfg(feature = "redis")]
pub use verification::redis_store::RedisVerificationStore;
