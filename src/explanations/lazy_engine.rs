use enumset::enum_set;
use enumset::EnumSet;

use crate::basic_types::Cause;
use crate::basic_types::EventKind;
use crate::basic_types::PropagatorId;
use crate::basic_types::VariableId;
use crate::containers::KeyedVec;
use crate::explanations::AntiDomain;
use crate::explanations::DomainEventObserver;
use crate::explanations::ExplanationEngine;
use crate::explanations::ExplanationOptions;
use crate::settings::ConfigurationError;
use crate::settings::Settings;

/// Event kinds that affect the anti-domain mirror; activations are skipped
/// during replay.
const REPLAYABLE: EnumSet<EventKind> = enum_set!(
    EventKind::Removal | EventKind::LowerBound | EventKind::UpperBound | EventKind::Assign
);

/// Per-variable state of the lazily maintained anti-domain mirror.
#[derive(Clone, Debug)]
struct Watched {
    initial_lower_bound: i32,
    initial_upper_bound: i32,
    anti_domain: AntiDomain,
}

/// An [`ExplanationEngine`] that additionally maintains per-variable
/// anti-domains, materialized lazily from the buffered events.
///
/// Event ingestion stays as cheap as the baseline engine: notifications only
/// append to the log. The derived anti-domain state is resynchronized on
/// demand, by replaying every buffered event in push order before a query is
/// answered. After a restart the caller marks the mirror outdated (and
/// clears the event log as usual); the next query rebuilds from the initial
/// bounds.
///
/// Replay is not safe to interleave with propagation: the caller must
/// guarantee that no events are pushed while a query runs.
#[derive(Debug)]
pub struct LazyExplanationEngine {
    base: ExplanationEngine,
    watched: KeyedVec<VariableId, Option<Watched>>,
    up_to_date: bool,
    replayed_until: usize,
}

impl LazyExplanationEngine {
    pub fn new(options: ExplanationOptions) -> Result<LazyExplanationEngine, ConfigurationError> {
        Ok(LazyExplanationEngine::wrap(ExplanationEngine::new(options)?))
    }

    pub fn with_settings(
        options: ExplanationOptions,
        settings: &Settings,
    ) -> Result<LazyExplanationEngine, ConfigurationError> {
        Ok(LazyExplanationEngine::wrap(ExplanationEngine::with_settings(options, settings)?))
    }

    fn wrap(base: ExplanationEngine) -> LazyExplanationEngine {
        LazyExplanationEngine {
            base,
            watched: KeyedVec::default(),
            up_to_date: true,
            replayed_until: 0,
        }
    }

    /// The wrapped engine, for explanation computation and refutation
    /// bookkeeping.
    pub fn base(&self) -> &ExplanationEngine {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ExplanationEngine {
        &mut self.base
    }

    /// Start mirroring `variable`, whose initial domain is
    /// `[lower_bound, upper_bound]`.
    pub fn watch(&mut self, variable: VariableId, lower_bound: i32, upper_bound: i32) {
        self.watched.accomodate(variable, None);
        self.watched[variable] = Some(Watched {
            initial_lower_bound: lower_bound,
            initial_upper_bound: upper_bound,
            anti_domain: AntiDomain::new(lower_bound, upper_bound),
        });
    }

    /// Invalidate the mirror, typically after a restart. The next query
    /// rebuilds it from the initial bounds and the current event log.
    pub fn mark_outdated(&mut self) {
        self.up_to_date = false;
    }

    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date && self.replayed_until == self.base.events().len()
    }

    /// The anti-domain of a watched variable, resynchronized first if
    /// needed.
    pub fn anti_domain(&mut self, variable: VariableId) -> &AntiDomain {
        self.replay();
        &self
            .watched
            .get(variable)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("{variable} is not watched"))
            .anti_domain
    }

    /// Has `value` ever been removed from the domain of `variable`?
    pub fn was_removed(&mut self, variable: VariableId, value: i32) -> bool {
        self.anti_domain(variable).is_removed(value)
    }

    fn replay(&mut self) {
        if !self.up_to_date {
            // Rebuild from scratch: the log no longer extends the state the
            // mirror was built from.
            for watched in self.watched.iter_mut().flatten() {
                watched.anti_domain =
                    AntiDomain::new(watched.initial_lower_bound, watched.initial_upper_bound);
            }
            self.replayed_until = 0;
            self.up_to_date = true;
        }

        let events = self.base.events();
        for index in self.replayed_until..events.len() {
            let kind = events.kind(index);
            if !REPLAYABLE.contains(kind) {
                continue;
            }
            let Some(watched) = self
                .watched
                .get_mut(events.variable(index))
                .and_then(Option::as_mut)
            else {
                continue;
            };

            let value = events.first_value(index);
            match kind {
                EventKind::Removal => watched.anti_domain.add(value),
                EventKind::LowerBound => watched.anti_domain.update_lower_bound(value),
                EventKind::UpperBound => watched.anti_domain.update_upper_bound(value),
                EventKind::Assign => watched.anti_domain.instantiate_to(value),
                EventKind::Activation => unreachable!("filtered above"),
            }
        }
        self.replayed_until = events.len();
    }
}

impl DomainEventObserver for LazyExplanationEngine {
    fn on_remove_value(&mut self, variable: VariableId, value: i32, cause: Cause) {
        self.base.on_remove_value(variable, value, cause);
    }

    fn on_update_lower_bound(
        &mut self,
        variable: VariableId,
        new_lower_bound: i32,
        old_lower_bound: i32,
        cause: Cause,
    ) {
        self.base
            .on_update_lower_bound(variable, new_lower_bound, old_lower_bound, cause);
    }

    fn on_update_upper_bound(
        &mut self,
        variable: VariableId,
        new_upper_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        self.base
            .on_update_upper_bound(variable, new_upper_bound, old_upper_bound, cause);
    }

    fn on_instantiate(
        &mut self,
        variable: VariableId,
        value: i32,
        old_lower_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    ) {
        self.base
            .on_instantiate(variable, value, old_lower_bound, old_upper_bound, cause);
    }

    fn on_propagator_activated(&mut self, variable: VariableId, propagator: PropagatorId) {
        self.base.on_propagator_activated(variable, propagator);
    }
}
