pub mod checker;
pub mod claims;
pub mod decision;
pub mod error;
pub mod factory;

#[cfg(test)]
pub mod testing;

pub use checker::{AuthzChecker, CheckerConfig};
pub use decision::{CheckDecision, CheckRequest, RpcCode};
pub use factory::build_checker;
