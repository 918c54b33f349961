//! Request authentication and upstream credential management.
//!
//! Two unrelated concerns live here because both are about proving
//! identity:
//! - [`guard`] checks what callers present to us (origin allowlist,
//!   API key) before the query pipeline runs.
//! - [`gcp`] manages the bearer token we present to Google for
//!   Vertex AI calls.

pub mod gcp;
pub mod guard;

pub use gcp::TokenManager;
pub use guard::{CorsPolicy, RequestGuard};
