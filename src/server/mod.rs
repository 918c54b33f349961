//! The HTTP server: configuration types and the axum service.
//!
//! [`config`] resolves TOML files and secrets into typed settings;
//! [`service`] turns an assembled [`AnswerGateway`](crate::gateway::AnswerGateway)
//! into a router. Wiring the two together (building adapters from
//! settings) lives in the `kvasird` binary.

pub mod config;
pub mod service;

pub use config::{Config, Secrets};
pub use service::{AppState, router};
