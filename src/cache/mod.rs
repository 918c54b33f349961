//! Answer caching over an external key-value store.
//!
//! Three layers, bottom up:
//! - [`store`] — the [`KvStore`] trait plus the in-memory (moka) and
//!   Cloudflare Workers KV backends.
//! - [`key`] — deterministic SHA-256 cache keys over
//!   `(model, variant, prompt)`.
//! - [`answers`] — the read-through/write-after [`AnswerCache`] the
//!   gateway talks to.
//!
//! The OAuth token manager shares the same store under its own
//! well-known key, so a single backend serves both concerns.

pub mod answers;
pub mod key;
pub mod store;

pub use answers::{ANSWER_TTL, AnswerCache};
pub use store::{KvStore, MemoryKvStore, WorkersKvStore};
