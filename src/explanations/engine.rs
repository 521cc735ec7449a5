use log::debug;

use crate::basic_types::Cause;
use crate::basic_types::Contradiction;
use crate::basic_types::EventKind;
use crate::basic_types::PropagatorId;
use crate::basic_types::ReadDomains;
use crate::basic_types::VariableId;
use crate::explanations::event_store::NO_VALUE;
use crate::explanations::DomainEventObserver;
use crate::explanations::EventStore;
use crate::explanations::ExplainerRegistry;
use crate::explanations::Explanation;
use crate::explanations::ExplanationPool;
use crate::explanations::RuleStore;
use crate::search::DecisionPath;
use crate::settings::ConfigurationError;
use crate::settings::Settings;

/// How explanations are computed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExplanationOptions {
    /// Keep track of the propagators in conflict. Needed when the causes of
    /// a conflict are reported back to the user; off by default because
    /// decision sets alone drive learning.
    pub save_causes: bool,
    /// Stop the scan at the first implicated left decision. Faster but
    /// weaker; the explanation keeps its rule set for later refinement.
    pub partial_explanations: bool,
}

/// The per-scan borrow bundle: the collaborators a scan consults but never
/// owns.
#[derive(Clone, Copy)]
pub struct ExplainContext<'a> {
    /// Current-domain queries for rule matching.
    pub domains: &'a dyn ReadDomains,
    /// Resolves decision world indices and the root sentinel.
    pub path: &'a dyn DecisionPath,
    /// Resolves propagator ids to their `why` callbacks.
    pub explainers: &'a dyn ExplainerRegistry,
}

impl std::fmt::Debug for ExplainContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainContext").finish_non_exhaustive()
    }
}

/// The entry point of the explanation engine.
///
/// The engine observes every domain modification through
/// [`DomainEventObserver`], appending to its [`EventStore`], and computes an
/// [`Explanation`] on demand when the search loop catches a contradiction.
/// The event log is logically owned by the caller: it must be cleared at
/// restart boundaries with [`ExplanationEngine::clear_events`].
#[derive(Debug)]
pub struct ExplanationEngine {
    events: EventStore,
    rule_store: RuleStore,
    pool: ExplanationPool,
    options: ExplanationOptions,
}

impl ExplanationEngine {
    /// Build an engine against the process-wide [`Settings::global`].
    pub fn new(options: ExplanationOptions) -> Result<ExplanationEngine, ConfigurationError> {
        ExplanationEngine::with_settings(options, Settings::global())
    }

    /// Build an engine against explicit settings. Fails fast, before any
    /// search begins, when explanation support is not enabled.
    pub fn with_settings(
        options: ExplanationOptions,
        settings: &Settings,
    ) -> Result<ExplanationEngine, ConfigurationError> {
        if !settings.explanations_enabled {
            return Err(ConfigurationError::ExplanationsNotEnabled);
        }

        Ok(ExplanationEngine {
            events: EventStore::default(),
            rule_store: RuleStore::new(options.save_causes, options.partial_explanations),
            pool: ExplanationPool::default(),
            options,
        })
    }

    pub fn options(&self) -> ExplanationOptions {
        self.options
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// Forget all logged events. Called by the owner of the search at
    /// restart and backtrack-to-root boundaries.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Compute the explanation of `contradiction` by scanning the event log
    /// backwards from the most recent entry.
    pub fn explain(
        &mut self,
        contradiction: Contradiction,
        context: &ExplainContext<'_>,
    ) -> Explanation {
        let mut explanation = self.pool.acquire(self.options.save_causes);
        self.rule_store
            .init(&mut explanation, context.path.root_world_index());

        match contradiction {
            Contradiction::EmptyDomain(variable) => {
                // Anything that touched the failing variable is relevant.
                let _ = self.rule_store.add_full_domain_rule(variable);
            }
            Contradiction::Propagator(propagator) => {
                let _ = explanation.add_cause(Cause::Propagator(propagator));
                context.explainers.explainer(propagator).why(
                    &mut self.rule_store,
                    context.domains,
                    None,
                    None,
                    NO_VALUE,
                );
            }
        }

        let mut index = self.events.len();
        while index > 0 && !self.rule_store.is_preempted_stop() {
            index -= 1;
            if self.rule_store.matches(index, &self.events, context.domains) {
                self.rule_store
                    .update(index, &self.events, &mut explanation, context);
            }
        }

        self.rule_store.finish(&mut explanation, &mut self.pool);
        debug!("explained {contradiction:?}: {explanation}");
        explanation
    }

    /// A fresh explanation from the pool, for callers that assemble one by
    /// hand (e.g. when seeding the refutation of a forced decision).
    pub fn make_explanation(&mut self) -> Explanation {
        self.pool.acquire(self.options.save_causes)
    }

    /// Return an explanation to the pool.
    pub fn recycle(&mut self, explanation: Explanation) {
        self.pool.recycle(explanation);
    }

    /// Store the explanation of the refutation of the decision at
    /// `world_index`.
    pub fn store_refutation(&mut self, world_index: u32, explanation: Explanation) {
        self.rule_store.store_refutation(world_index, explanation);
    }

    /// Relocate a stored refutation towards the root.
    pub fn move_refutation(&mut self, from_world_index: u32, to_world_index: u32) {
        self.rule_store
            .move_refutation(from_world_index, to_world_index);
    }

    /// Recycle the refutation of a decision leaving the live search tree.
    pub fn free_refutation(&mut self, world_index: u32) {
        self.rule_store.free_refutation(world_index, &mut self.pool);
    }

    /// The stored refutation of the decision at `world_index`; fatal when
    /// absent.
    pub fn refutation(&self, world_index: u32) -> &Explanation {
        self.rule_store.refutation(world_index)
    }
}

impl DomainEventObserver for ExplanationEngine {
    fn on_remove_value(&mut self, variable: VariableId, value: i32, cause: Cause) {
        let _ = self.events.push_event(
            variable,
            cause,
            EventKind::Removal,
            value,
            NO_VALUE,
            NO_VALUE,
        );
    }

    fn on_update_lower_bound(
        &mut self,
        variable: VariableId,
        new_lower_bound: i32,
        old_lower_bound: i32,
        cause: Cause,
    ) {
        let _ = self.events.push_event(
            variable,
            cause,
            EventKind::LowerBound,
            new_lower_bound,
            old_lower_bound,
            NO_VALUE,
        );
    }

    fn on_update_upper_bound(
        &mut self,
        variable: VariableId,
        new_upper_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        let _ = self.events.push_event(
            variable,
            cause,
            EventKind::UpperBound,
            new_upper_bound,
            old_upper_bound,
            NO_VALUE,
        );
    }

    fn on_instantiate(
        &mut self,
        variable: VariableId,
        value: i32,
        old_lower_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        let _ = self.events.push_event(
            variable,
            cause,
            EventKind::Assign,
            value,
            old_lower_bound,
            old_upper_bound,
        );
    }

    fn on_propagator_activated(&mut self, variable: VariableId, propagator: PropagatorId) {
        let _ = self.events.push_event(
            variable,
            Cause::Propagator(propagator),
            EventKind::Activation,
            propagator.0 as i32,
            NO_VALUE,
            NO_VALUE,
        );
    }
}
