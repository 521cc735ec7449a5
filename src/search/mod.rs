//! The contracts through which the engine observes the search tree. The
//! search strategy itself lives in the owning solver; the explanation engine
//! only consumes decisions.
mod decision;

pub use decision::Decision;
pub use decision::DecisionPath;
