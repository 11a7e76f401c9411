//! # Verification Codes
//!
//! One-time codes sent by SMS to confirm a customer's phone number.
//!
//! ## Store Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  issue(phone, ttl)                                                      │
//! │       │  normalize_msisdn → 2547XXXXXXXX                                │
//! │       │  random 6-digit code, replaces any earlier code for the phone   │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────┐                                      │
//! │  │ phone → (code, expiry, tries)│  SQLite table or Redis key with TTL  │
//! │  └──────────────────────────────┘                                      │
//! │       │                                                                 │
//! │  verify(phone, code)                                                    │
//! │       ├── missing / expired ──────────► false                          │
//! │       ├── match ──────────────────────► true, code consumed            │
//! │       └── mismatch ──► tries += 1 ────► false (code dropped at 5)      │
//! │                                                                         │
//! │  purge_expired() ── explicit eviction (Redis expires keys itself)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes live outside the process, so they survive restarts and are shared
//! by every instance behind the load balancer.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::DbResult;

#[cfg(feature = "redis")]
pub mod redis_store;
pub mod sqlite;

/// Wrong guesses allowed before a code is discarded.
pub const MAX_ATTEMPTS: i64 = 5;

/// A keyed store of verification codes with explicit expiry.
pub trait VerificationStore {
    /// Issues a fresh code for `phone`, replacing any outstanding one.
    fn issue(&self, phone: &str, ttl: Duration) -> impl Future<Output = DbResult<String>> + Send;

    /// Checks `code` for `phone`. A correct code is consumed.
    fn verify(&self, phone: &str, code: &str) -> impl Future<Output = DbResult<bool>> + Send;

    /// Deletes expired codes and returns how many were removed.
    fn purge_expired(&self) -> impl Future<Output = DbResult<u64>> + Send;
}

/// Six random digits, zero padded.
pub fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0u32..1_000_000))
}
