//! # Repository Module
//!
//! Database repository implementations for Duka.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Route handler                                                         │
//! │       │                                                                 │
//! │       │  db.coupons().redeem(&request)                                 │
//! │       ▼                                                                 │
//! │  CouponRepository                                                      │
//! │  ├── insert / get_by_id / get_by_code / list_active / set_active       │
//! │  └── redeem  ── one transaction, pricing delegated to duka-core        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`coupon::CouponRepository`] - Coupons and atomic redemption
//! - [`zone::ZoneRepository`] - Delivery zones and point matching
//! - [`reward::RewardRepository`] - Spending brackets and the order accumulator
//! - [`spin::SpinRepository`] - Spin-wheel prizes and draws

pub mod coupon;
pub mod reward;
pub mod spin;
pub mod zone;
