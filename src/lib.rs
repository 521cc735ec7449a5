//! Calabash is a conflict explanation engine for constraint programming
//! solvers. It records every domain-modifying event observed during
//! propagation in an append-only log and, when a contradiction is caught,
//! scans that log in reverse chronological order to compute which search
//! decisions and propagators are responsible.
//!
//! The entry point is [`ExplanationEngine`]; the surrounding solver feeds it
//! through the [`DomainEventObserver`] notification surface and calls
//! [`ExplanationEngine::explain`] when propagation fails.

pub mod asserts;
pub mod basic_types;
pub mod containers;
pub mod explanations;
pub mod search;
pub mod settings;

pub use crate::basic_types::Cause;
pub use crate::basic_types::Contradiction;
pub use crate::basic_types::EventKind;
pub use crate::basic_types::Predicate;
pub use crate::basic_types::PropagatorId;
pub use crate::basic_types::ReadDomains;
pub use crate::basic_types::VariableId;
pub use crate::explanations::AntiDomain;
pub use crate::explanations::DomainEventObserver;
pub use crate::explanations::Event;
pub use crate::explanations::EventStore;
pub use crate::explanations::ExplainContext;
pub use crate::explanations::Explainer;
pub use crate::explanations::ExplainerRegistry;
pub use crate::explanations::Explanation;
pub use crate::explanations::ExplanationEngine;
pub use crate::explanations::ExplanationOptions;
pub use crate::explanations::ExplanationPool;
pub use crate::explanations::LazyExplanationEngine;
pub use crate::explanations::NogoodStore;
pub use crate::explanations::RuleStore;
pub use crate::explanations::Rules;
pub use crate::explanations::ThreadedEventRecorder;
pub use crate::search::Decision;
pub use crate::search::DecisionPath;
pub use crate::settings::ConfigurationError;
pub use crate::settings::Settings;
