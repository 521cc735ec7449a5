//! The conflict explanation engine.
//!
//! During propagation, every domain modification is appended to an
//! [`EventStore`]. When a contradiction is caught, the engine computes an
//! [`Explanation`] by scanning that log in reverse chronological order: a
//! [`Rules`] set, seeded from the contradiction, decides for each event
//! whether it is relevant ([`RuleStore::matches`]); relevant events either
//! implicate a search decision, splice in the cached explanation of an
//! already-refuted decision, or hand control to the causing propagator's
//! [`Explainer::why`] callback, which grows the rule set so that older
//! events become relevant in turn ([`RuleStore::update`]).
//!
//! Scanning strictly backwards is what makes this correct: when an event is
//! reached, every later event that depended on it has already been
//! processed, so the rules describing its relevance are final.
//!
//! Two variants relax the baseline single-threaded engine:
//! [`LazyExplanationEngine`] additionally mirrors per-variable anti-domains,
//! resynchronized on demand after a restart, and [`ThreadedEventRecorder`]
//! moves log maintenance to a background thread.

mod anti_domain;
mod engine;
mod event_store;
mod explainer;
mod explanation;
mod lazy_engine;
mod nogood;
mod observer;
mod rule_store;
mod rules;
mod threaded;

pub use anti_domain::AntiDomain;
pub use engine::ExplainContext;
pub use engine::ExplanationEngine;
pub use engine::ExplanationOptions;
pub use event_store::Event;
pub use event_store::EventStore;
pub use event_store::NO_VALUE;
pub use explainer::Explainer;
pub use explainer::ExplainerRegistry;
pub use explanation::Explanation;
pub use explanation::ExplanationPool;
pub use lazy_engine::LazyExplanationEngine;
pub use nogood::NogoodStore;
pub use observer::DomainEventObserver;
pub use rule_store::RuleStore;
pub use rules::Rules;
pub use threaded::ThreadedEventRecorder;
