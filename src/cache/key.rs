//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Compute the answer-cache key for a `(model, variant, prompt)` tuple.
///
/// Hex-encoded SHA-256 of `model[:variant]:prompt`, variant segment
/// omitted entirely when absent. A cryptographic hash gives fixed-size
/// keys with no collisions across arbitrarily long prompts; the hash is
/// stable across processes, so the key works for shared backends too.
pub fn answer_key(model: &str, variant: Option<&str>, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update(b":");
    if let Some(variant) = variant {
        hasher.update(variant.as_bytes());
        hasher.update(b":");
    }
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}
