pub mod evaluator;
pub mod fingerprint;
pub mod quota;
pub mod types;

pub use evaluator::AccessGate;
pub use types::{AccessDecision, AccessSummary, Identity, UNLIMITED};
