//! Credential handling: opaque bearer tokens, password hashing, and
//! one-time codes.
//!
//! Tokens are 32 random bytes, URL-safe base64 on the wire, and resolved
//! against an in-memory store keyed by SHA-256 digest. Two principal kinds
//! share one store; the kind is the type discriminator the middleware uses
//! to reject a token presented to the wrong surface.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use uuid::Uuid;

use crate::models::enums::Role;

/// Session lifetime: 7 days.
const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// PBKDF2-SHA256 work factor for stored passwords.
const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Cleanup threshold for the session map.
const SESSION_CLEANUP_THRESHOLD: usize = 10_000;

/// One-time code validity window.
pub const OTP_VALIDITY: chrono::Duration = chrono::Duration::minutes(5);

/// Identity carried by an account (doctor/government) token.
#[derive(Debug, Clone)]
pub struct AccountClaims {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub hospital_name: Option<String>,
    pub hospital_id: Option<String>,
}

/// Identity carried by a worker token.
#[derive(Debug, Clone)]
pub struct WorkerClaims {
    pub id: Uuid,
    pub unique_id: String,
    pub name: String,
}

/// The authenticated party behind a bearer token.
#[derive(Debug, Clone)]
pub enum Principal {
    Account(AccountClaims),
    Worker(WorkerClaims),
}

struct SessionEntry {
    principal: Principal,
    expires_at: Instant,
}

/// In-memory token → principal store with TTL.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            ttl: SESSION_TTL,
        }
    }

    /// Issue a fresh token for the principal.
    pub fn issue(&mut self, principal: Principal) -> String {
        if self.sessions.len() > SESSION_CLEANUP_THRESHOLD {
            self.cleanup();
        }
        let token = generate_token();
        self.sessions.insert(
            hash_token(&token),
            SessionEntry {
                principal,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Resolve a token to its principal. `None` for unknown or expired.
    pub fn resolve(&self, token: &str) -> Option<Principal> {
        let entry = self.sessions.get(&hash_token(token))?;
        if Instant::now() > entry.expires_at {
            return None;
        }
        Some(entry.principal.clone())
    }

    fn cleanup(&mut self) {
        let now = Instant::now();
        self.sessions.retain(|_, entry| now < entry.expires_at);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a password with PBKDF2-SHA256 and a random salt.
///
/// Stored as `pbkdf2-sha256$<iterations>$<salt-b64>$<hash-b64>` so the work
/// factor can be raised later without invalidating existing rows.
pub fn hash_password(password: &str) -> String {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    format!(
        "pbkdf2-sha256${PBKDF2_ITERATIONS}${}${}",
        b64.encode(salt),
        b64.encode(hash)
    )
}

/// Verify a password against a stored hash string. Malformed stored values
/// never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (scheme, iterations, salt, hash) = match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(scheme), Some(iterations), Some(salt), Some(hash), None) => {
            (scheme, iterations, salt, hash)
        }
        _ => return false,
    };
    if scheme != "pbkdf2-sha256" {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    let (Ok(salt), Ok(expected)) = (b64.decode(salt), b64.decode(hash)) else {
        return false;
    };

    derive(password, &salt, iterations)[..] == expected[..]
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

/// Generate a 6-digit one-time code.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
