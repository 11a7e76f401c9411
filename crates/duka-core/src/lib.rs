//! # duka-core: Pure Pricing Logic for the Duka Storefront
//!
//! This crate holds every rule that turns a cart, a location and a coupon
//! into a price: delivery fees, zone matching, discounts, reward brackets,
//! loyalty points and the spin wheel. All of it is pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (browser)                         │   │
//! │  │    Map pin ──► Cart ──► Coupon box ──► Checkout ──► Rewards    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Route handlers                               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ duka-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │   geo   │ │ delivery │ │ coupon  │ │ rewards │ │  spin  │  │   │
//! │  │   │Haversine│ │ fee/zone │ │ pricing │ │ brackets│ │ weights│  │   │
//! │  │   └─────────┘ └──────────┘ └─────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    duka-db (Database Layer)                     │   │
//! │  │   SQLite, migrations, repositories, atomic redemption, OTPs     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Coupon, DeliveryZone, SpendingBracket, etc.)
//! - [`money`] - Money type with integer arithmetic in minor units
//! - [`geo`] - Great-circle distance
//! - [`delivery`] - Distance fee policy and zone matcher
//! - [`coupon`] - Coupon validation and discount pricing
//! - [`rewards`] - Ten-order reward-bracket accumulator
//! - [`loyalty`] - Points and tiers
//! - [`spin`] - Spin-wheel weighted selection
//! - [`validation`] - Boundary validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: `now` and random rolls are parameters, never read here
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are KES minor units (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::delivery::{quote, DeliveryFeeConfig};
//! use duka_core::Coordinate;
//!
//! let store = Coordinate::new(-1.2864, 36.8172);
//! let customer = Coordinate::new(-1.2676, 36.8108);
//!
//! let q = quote(store, customer, &DeliveryFeeConfig::default());
//! assert!(!q.fee.is_free);
//! assert_eq!(q.fee.fee.minor() % 1_000, 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod delivery;
pub mod error;
pub mod geo;
pub mod loyalty;
pub mod money;
pub mod rewards;
pub mod spin;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use duka_core::Money` instead of
// `use duka_core::money::Money`

pub use coupon::CouponPricing;
pub use delivery::{DeliveryFee, DeliveryFeeConfig, DeliveryQuote};
pub use error::{CoreError, CoreResult, CouponError, ValidationError};
pub use loyalty::{LoyaltyConfig, LoyaltyTier};
pub use money::Money;
pub use rewards::RewardOutcome;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID (single-tenant runtime with a multi-tenant schema).
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";
