pub mod engine;
pub mod types;

pub use engine::{DecisionEngine, DECISION_THRESHOLD};
pub use types::{Classification, Mood};
