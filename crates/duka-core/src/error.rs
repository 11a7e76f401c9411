//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                          │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── CouponError      - Business-rule rejections of a coupon           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  duka-db errors (separate crate)                                       │
//! │  └── DbError          - Database failures, wraps CouponError           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → route handler → client  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, amounts)
//! 3. Errors are enum variants, never String
//! 4. Coupon rejections carry a stable wire code for the frontend

use serde::Serialize;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coupon was rejected by a business rule.
    #[error("Coupon rejected: {0}")]
    Coupon(#[from] CouponError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Coupon Error
// =============================================================================

/// Why a coupon cannot be applied to an order.
///
/// These are terminal, user-facing outcomes. None of them is transient, so
/// callers surface them verbatim and never retry.
///
/// ## Check Order
/// ```text
/// active && starts_at <= now <= ends_at ──no──► Expired
///            │
/// order >= min_order_amount ───────────no──► BelowMinimum
///            │
/// used_count < max_uses ───────────────no──► GlobalLimitReached
///            │
/// user usage < max_uses_per_user ──────no──► UserLimitReached
///            │
///            ▼
///         priced
/// ```
/// `NotFound` is raised by the lookup step before any of the above runs.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponError {
    #[error("Coupon {code} is expired or inactive")]
    Expired { code: String },

    #[error("Order amount {actual} is below the coupon minimum of {minimum}")]
    BelowMinimum { minimum: Money, actual: Money },

    #[error("Coupon {code} has reached its usage limit")]
    GlobalLimitReached { code: String },

    #[error("Coupon {code} has already been used the maximum number of times by this customer")]
    UserLimitReached { code: String },

    #[error("Coupon not found: {code}")]
    NotFound { code: String },
}

impl CouponError {
    /// Stable code surfaced to clients (`"EXPIRED"`, `"BELOW_MINIMUM"`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            CouponError::Expired { .. } => "EXPIRED",
            CouponError::BelowMinimum { .. } => "BELOW_MINIMUM",
            CouponError::GlobalLimitReached { .. } => "GLOBAL_LIMIT_REACHED",
            CouponError::UserLimitReached { .. } => "USER_LIMIT_REACHED",
            CouponError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary, before any pricing function runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Integer value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Floating point value (coordinate, distance) is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRangeF64 {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Spending brackets overlap or are out of order.
    #[error("Invalid bracket configuration: {reason}")]
    InvalidBrackets { reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
