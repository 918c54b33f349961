//! Public types for the Kvasir API.

mod model;
mod query;
mod response;

pub use model::Model;
pub use query::{MAX_PROMPT_CHARS, MAX_VARIANT_CHARS, QueryRequest, RawQuery};
pub use response::{ErrorBody, QueryResponse, StatusResponse};
