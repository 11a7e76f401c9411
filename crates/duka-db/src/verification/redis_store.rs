//! Redis-backed verification code store (feature `redis`).
//!
//! ```text
//! otp:{phone}           → code          SET .. EX ttl
//! otp_attempts:{phone}  → wrong guesses INCR, EXPIRE to the code's TTL
//! ```
//!
//! `verify` runs as one Lua script, so two requests for the same phone
//! cannot both consume a code or both skip an attempt.
//!
//! Redis evicts expired keys itself, so `purge_expired` has nothing to do.

use std::time::Duration;

use duka_core::validation::normalize_msisdn;
use redis::aio::MultiplexedConnection;
use redis::Script;
use tracing::{debug, info, warn};

use super::{generate_code, VerificationStore, MAX_ATTEMPTS};
use crate::error::DbResult;

/// Verification codes in Redis.
#[derive(Clone)]
pub struct RedisVerificationStore {
    conn: MultiplexedConnection,
}

impl RedisVerificationStore {
    /// Connects to `redis_url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(redis_url: &str) -> DbResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis verification store");
        Ok(RedisVerificationStore { conn })
    }

    pub fn from_connection(conn: MultiplexedConnection) -> Self {
        RedisVerificationStore { conn }
    }
}

const VERIFIED: i64 = 1;
const DISCARDED: i64 = -1;

/// Compare, consume and count in one step.
/// KEYS: code, attempts. ARGV: submitted code, attempt limit.
const VERIFY_SCRIPT: &str = r#"
local stored = redis.call('GET', KEYS[1])
if not stored then
    return 0
end
if stored == ARGV[1] then
    redis.call('DEL', KEYS[1], KEYS[2])
    return 1
end
local attempts = redis.call('INCR', KEYS[2])
if attempts >= tonumber(ARGV[2]) then
    redis.call('DEL', KEYS[1], KEYS[2])
    return -1
end
local remaining = redis.call('PTTL', KEYS[1])
if remaining > 0 then
    redis.call('PEXPIRE', KEYS[2], remaining)
end
return 0
"#;

fn code_key(phone: &str) -> String {
    format!("otp:{phone}")
}

fn attempts_key(phone: &str) -> String {
    format!("otp_attempts:{phone}")
}

impl VerificationStore for RedisVerificationStore {
    async fn issue(&self, phone: &str, ttl: Duration) -> DbResult<String> {
        let phone = normalize_msisdn(phone)?;
        let code = generate_code();
        let mut conn = self.conn.clone();

        // EX 0 is rejected by Redis
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = redis::pipe()
            .atomic()
            .set_ex(code_key(&phone), &code, ttl_secs)
            .ignore()
            .del(attempts_key(&phone))
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(phone = %phone, ttl_secs, "Verification code issued");
        Ok(code)
    }

    async fn verify(&self, phone: &str, code: &str) -> DbResult<bool> {
        let phone = normalize_msisdn(phone)?;
        let mut conn = self.conn.clone();

        let verdict: i64 = Script::new(VERIFY_SCRIPT)
            .key(code_key(&phone))
            .key(attempts_key(&phone))
            .arg(code.trim())
            .arg(MAX_ATTEMPTS)
            .invoke_async(&mut conn)
            .await?;

        match verdict {
            VERIFIED => {
                info!(phone = %phone, "Phone verified");
                Ok(true)
            }
            DISCARDED => {
                warn!(phone = %phone, "Verification code discarded after too many attempts");
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        Ok(0)
    }
}
