//! Query pipeline: an answer cache in front of policy-checked provider
//! routing.

mod answer;
mod policy;
mod set;

pub use answer::{AnswerGateway, GatewayAnswer};
pub use policy::GatewayPolicy;
pub use set::ProviderSet;
