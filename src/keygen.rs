//! Random key generation for values stored without a caller-chosen key.

use uuid::Uuid;

/// Returns a fresh random key (hyphenated UUID v4).
pub fn random_key() -> String {
    Uuid::new_v4().to_string()
}
