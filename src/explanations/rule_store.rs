use log::debug;

use crate::basic_types::Cause;
use crate::basic_types::EventKind;
use crate::basic_types::PropagatorId;
use crate::basic_types::ReadDomains;
use crate::basic_types::VariableId;
use crate::calabash_assert_moderate;
use crate::calabash_assert_simple;
use crate::explanations::EventStore;
use crate::explanations::ExplainContext;
use crate::explanations::Explanation;
use crate::explanations::ExplanationPool;
use crate::explanations::Rules;

/// The orchestrator of the backward scan.
///
/// A rule store carries the state of one `explain` invocation at a time: the
/// rule set taken from the explanation under construction at
/// [`RuleStore::init`] and handed back at [`RuleStore::finish`], the
/// preempted-stop flag, a snapshot of the root world index, and scratch
/// fields that guard the `matches`/`update` pairing. It also owns the
/// per-decision refutation cache that lives for the whole search session.
///
/// For every logged event, scanned most recent first, [`RuleStore::matches`]
/// decides whether the event is relevant to any active rule and
/// [`RuleStore::update`] then grows the explanation: recording a left-branch
/// decision, splicing in the cached explanation of a refuted decision, or
/// delegating to the causing propagator's
/// [`why`](crate::explanations::Explainer::why) callback.
#[derive(Debug)]
pub struct RuleStore {
    save_causes: bool,
    partial_explanations: bool,
    active_rules: Option<Rules>,
    preempted_stop: bool,
    root_world: u32,
    last_variable: Option<VariableId>,
    last_kind: Option<EventKind>,
    last_value: i32,
    refutations: Vec<Option<Explanation>>,
}

impl RuleStore {
    /// `save_causes` keeps track of the propagators in conflict (needed for
    /// user feedback); `partial_explanations` allows the scan to stop at the
    /// first implicated left decision, which is faster but weaker.
    pub fn new(save_causes: bool, partial_explanations: bool) -> RuleStore {
        RuleStore {
            save_causes,
            partial_explanations,
            active_rules: None,
            preempted_stop: false,
            root_world: 0,
            last_variable: None,
            last_kind: None,
            last_value: 0,
            refutations: (0..16).map(|_| None).collect(),
        }
    }

    pub fn save_causes(&self) -> bool {
        self.save_causes
    }

    pub fn partial_explanations(&self) -> bool {
        self.partial_explanations
    }

    /// Bind this store to a fresh explanation: take over its rule set and
    /// reset the per-scan state. `root_world` is the world index of the root
    /// sentinel of the current search.
    pub fn init(&mut self, explanation: &mut Explanation, root_world: u32) {
        self.active_rules = Some(
            explanation
                .take_rules()
                .expect("internal consistency error: explaining with a complete explanation"),
        );
        self.preempted_stop = false;
        self.root_world = root_world;
        self.last_variable = None;
        self.last_kind = None;
        self.last_value = 0;
    }

    /// Conclude the scan: in partial mode the rule set goes back into the
    /// explanation for later refinement; otherwise it is cleared into the
    /// pool and the explanation becomes complete.
    pub fn finish(&mut self, explanation: &mut Explanation, pool: &mut ExplanationPool) {
        let rules = self
            .active_rules
            .take()
            .expect("internal consistency error: finishing without an active scan");
        if self.partial_explanations {
            explanation.install_rules(rules);
        } else {
            pool.reclaim_rules(rules);
        }
    }

    /// True once enough decisions are implicated that the remaining events
    /// cannot change the explanation; the scan may stop early.
    pub fn is_preempted_stop(&self) -> bool {
        self.preempted_stop
    }

    fn rules(&self) -> &Rules {
        self.active_rules
            .as_ref()
            .expect("internal consistency error: no active scan")
    }

    fn rules_mut(&mut self) -> &mut Rules {
        self.active_rules
            .as_mut()
            .expect("internal consistency error: no active scan")
    }

    /// Does the event at `index` match one of the active rules?
    pub fn matches(
        &mut self,
        index: usize,
        events: &EventStore,
        domains: &dyn ReadDomains,
    ) -> bool {
        let variable = events.variable(index);
        let kind = events.kind(index);
        // Either the propagator id (activation) or the value tied to the
        // variable event, e.g. the instantiated value.
        let first = events.first_value(index);

        self.last_variable = Some(variable);
        self.last_kind = Some(kind);
        self.last_value = first;

        if kind == EventKind::Activation {
            return self.rules().has_activation_rule(PropagatorId(first as u32));
        }

        match self.rules().mask(variable) {
            // Skips the detailed dispatch on the hot path.
            Some(Rules::FULL_DOMAIN) => true,
            Some(mask) => self.matches_domain(
                mask,
                variable,
                kind,
                first,
                events.second_value(index),
                events.third_value(index),
                domains,
            ),
            None => false,
        }
    }

    /// Does a domain-modification event match the rule mask recorded for its
    /// variable?
    ///
    /// `first`/`second`/`third` are the payload slots of the event (see
    /// [`EventStore`]). Combinations that cannot arise from a well-formed
    /// event log are fatal.
    #[allow(clippy::too_many_arguments, reason = "mirrors the event slot layout")]
    pub fn matches_domain(
        &self,
        mask: u8,
        variable: VariableId,
        kind: EventKind,
        first: i32,
        second: i32,
        third: i32,
        domains: &dyn ReadDomains,
    ) -> bool {
        match (mask, kind) {
            (Rules::FULL_DOMAIN, _) => true,

            (
                Rules::BOTH_BOUNDS,
                EventKind::Assign | EventKind::LowerBound | EventKind::UpperBound,
            ) => true,
            // A removal is only a bound modification when it lies outside
            // the current bounds.
            (Rules::BOTH_BOUNDS, EventKind::Removal) => {
                first < domains.lower_bound(variable) || first > domains.upper_bound(variable)
            }

            (Rules::UPPER_BOUND, EventKind::Assign) => first < third,
            (Rules::UPPER_BOUND, EventKind::UpperBound) => true,
            (Rules::UPPER_BOUND, EventKind::LowerBound) => false,
            (Rules::UPPER_BOUND, EventKind::Removal) => first > domains.upper_bound(variable),

            (Rules::LOWER_BOUND, EventKind::Assign) => first > second,
            (Rules::LOWER_BOUND, EventKind::LowerBound) => true,
            (Rules::LOWER_BOUND, EventKind::UpperBound) => false,
            (Rules::LOWER_BOUND, EventKind::Removal) => first < domains.lower_bound(variable),

            (Rules::REMOVAL, _) if domains.has_enumerated_domain(variable) => match kind {
                EventKind::Assign => self.rules().intersects(second, third, variable),
                EventKind::UpperBound => self.rules().intersects(first, second, variable),
                EventKind::LowerBound => self.rules().intersects(second, first, variable),
                EventKind::Removal => self
                    .rules()
                    .removed_values(variable)
                    .is_some_and(|set| set.contains(&first)),
                EventKind::Activation => {
                    panic!("internal consistency error: activation event in domain matching")
                }
            },

            (mask, kind) => panic!(
                "internal consistency error: no rule semantics for mask {mask} and event {kind:?} \
                 on {variable}"
            ),
        }
    }

    /// Update the rule store and the explanation for the matched event at
    /// `index`.
    pub fn update(
        &mut self,
        index: usize,
        events: &EventStore,
        explanation: &mut Explanation,
        context: &ExplainContext<'_>,
    ) {
        debug!(
            "update < {} / {} / {:?} / {} / {} / {} >",
            events.variable(index),
            events.cause(index),
            events.kind(index),
            events.first_value(index),
            events.second_value(index),
            events.third_value(index),
        );
        calabash_assert_moderate!(
            self.last_variable == Some(events.variable(index)),
            "wrong variable loaded between matches and update"
        );
        calabash_assert_moderate!(
            self.last_kind == Some(events.kind(index)),
            "wrong event loaded between matches and update"
        );

        let variable = events.variable(index);
        let kind = events.kind(index);

        if kind == EventKind::Activation {
            // The activation is now explained by anything that touched the
            // triggering variable; the activation rule itself is subsumed.
            let propagator = PropagatorId(events.first_value(index) as u32);
            let _ = self.add_full_domain_rule(variable);
            self.rules_mut().clear_activation_rule(propagator);
            return;
        }

        match events.cause(index) {
            Cause::Decision(world) => {
                let decision = context.path.decision(world);
                calabash_assert_moderate!(
                    decision.world_index() == world,
                    "decision path returned a decision from another world"
                );

                if decision.has_next() {
                    // A left branch is its own explanation.
                    explanation.add_decision(world);
                    if self.partial_explanations {
                        self.preempted_stop = true;
                        explanation.set_last_event_index(index);
                    }
                } else {
                    // A right branch stands for the refutation of its left
                    // sibling, which was explained when it was refuted.
                    let refutation = self
                        .refutations
                        .get(world as usize)
                        .and_then(Option::as_ref)
                        .unwrap_or_else(|| {
                            panic!(
                                "internal consistency error: refuted decision at world {world} \
                                 was never explained"
                            )
                        });
                    explanation.merge_causes_and_decisions(refutation);
                    if let Some(rules) = refutation.rules() {
                        self.active_rules
                            .as_mut()
                            .expect("internal consistency error: no active scan")
                            .merge_from(rules);
                    }
                }

                if !self.save_causes
                    && explanation.previous_clear_decision(world) == Some(self.root_world)
                {
                    // Every decision from here down to the root is
                    // implicated; without cause tracking nothing else can be
                    // learned from older events.
                    self.preempted_stop = true;
                }
            }
            Cause::Propagator(propagator) => {
                calabash_assert_moderate!(
                    self.last_value == events.first_value(index),
                    "wrong value loaded between matches and update"
                );

                let _ = explanation.add_cause(Cause::Propagator(propagator));
                context.explainers.explainer(propagator).why(
                    self,
                    context.domains,
                    Some(variable),
                    Some(kind),
                    events.first_value(index),
                );
            }
        }
    }

    /// Retain the event that removed `value` from the variable.
    ///
    /// For bounded domains the removal is converted to the matching bound
    /// rule; a strictly interior value cannot be removed from an interval
    /// and indicates desynchronized bookkeeping.
    pub fn add_removal_rule(
        &mut self,
        variable: VariableId,
        value: i32,
        domains: &dyn ReadDomains,
    ) -> bool {
        if domains.has_enumerated_domain(variable) {
            let _ = self.rules_mut().put_mask(variable, Rules::REMOVAL);
            self.rules_mut().removed_values_mut(variable).insert(value)
        } else if value <= domains.lower_bound(variable) {
            self.add_lower_bound_rule(variable)
        } else if value >= domains.upper_bound(variable) {
            self.add_upper_bound_rule(variable)
        } else {
            panic!(
                "internal consistency error: removal rule for interior value {value} of bounded \
                 variable {variable}"
            )
        }
    }

    /// Retain every event involving the variable.
    pub fn add_full_domain_rule(&mut self, variable: VariableId) -> bool {
        self.rules_mut().put_mask(variable, Rules::FULL_DOMAIN)
    }

    /// Retain events on the lower bound of the variable.
    pub fn add_lower_bound_rule(&mut self, variable: VariableId) -> bool {
        self.rules_mut().put_mask(variable, Rules::LOWER_BOUND)
    }

    /// Retain events on the upper bound of the variable.
    pub fn add_upper_bound_rule(&mut self, variable: VariableId) -> bool {
        self.rules_mut().put_mask(variable, Rules::UPPER_BOUND)
    }

    /// Retain events on either bound of the variable.
    pub fn add_bounds_rule(&mut self, variable: VariableId) -> bool {
        self.rules_mut().put_mask(variable, Rules::BOTH_BOUNDS)
    }

    /// Retain the activation event of the propagator.
    pub fn add_activation_rule(&mut self, propagator: PropagatorId) -> bool {
        self.rules_mut().add_activation_rule(propagator)
    }

    /// The current rule mask of the variable, if any.
    pub fn mask(&self, variable: VariableId) -> Option<u8> {
        self.rules().mask(variable)
    }

    /// Store the explanation of a decision's refutation, for reuse whenever
    /// the scan meets the corresponding right branch.
    pub fn store_refutation(&mut self, world_index: u32, explanation: Explanation) {
        let index = world_index as usize;
        if index >= self.refutations.len() {
            self.refutations.resize_with(index + 10, || None);
        }
        calabash_assert_moderate!(
            explanation
                .decisions()
                .ones()
                .max()
                .map_or(true, |highest| highest < index),
            "a refutation may only implicate decisions older than its own"
        );
        self.refutations[index] = Some(explanation);
    }

    /// Relocate a stored refutation when backtracking moves its decision to
    /// an earlier world index.
    pub fn move_refutation(&mut self, from_world_index: u32, to_world_index: u32) {
        calabash_assert_simple!(
            to_world_index <= from_world_index,
            "refutations only move towards the root"
        );
        if to_world_index < from_world_index {
            self.refutations[to_world_index as usize] =
                self.refutations[from_world_index as usize].take();
        }
    }

    /// Recycle the refutation stored at `world_index`, if any. Freeing an
    /// empty slot is a no-op: a decision may leave the live search tree
    /// before it was ever refuted.
    pub fn free_refutation(&mut self, world_index: u32, pool: &mut ExplanationPool) {
        if let Some(slot) = self.refutations.get_mut(world_index as usize) {
            if let Some(explanation) = slot.take() {
                pool.recycle(explanation);
            }
        }
    }

    /// The stored refutation of the decision at `world_index`. A refuted
    /// decision must have been explained when it was refuted; anything else
    /// is fatal.
    pub fn refutation(&self, world_index: u32) -> &Explanation {
        self.refutations
            .get(world_index as usize)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| {
                panic!(
                    "internal consistency error: refuted decision at world {world_index} was \
                     never explained"
                )
            })
    }

    /// Reset the per-scan state: clear the active rules and scratch fields
    /// and re-snapshot the root world index. The refutation cache survives;
    /// it belongs to the whole search session.
    pub fn clear(&mut self, root_world: u32) {
        if let Some(rules) = self.active_rules.as_mut() {
            rules.clear();
        }
        self.preempted_stop = false;
        self.root_world = root_world;
        self.last_variable = None;
        self.last_kind = None;
        self.last_value = 0;
    }

    /// Whether a refutation is stored for `world_index`.
    pub fn has_refutation(&self, world_index: u32) -> bool {
        self.refutations
            .get(world_index as usize)
            .is_some_and(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explanations::test_helpers::SilentExplainer;
    use crate::explanations::test_helpers::TestDomains;
    use crate::explanations::test_helpers::TestPath;
    use crate::explanations::test_helpers::UniformExplainers;

    fn var(id: u32) -> VariableId {
        VariableId::new(id)
    }

    /// A rule store with a live scan session rooted at world 0.
    fn store_with_session(save_causes: bool, partial: bool) -> (RuleStore, Explanation, ExplanationPool) {
        let mut pool = ExplanationPool::default();
        let mut explanation = pool.acquire(save_causes);
        let mut store = RuleStore::new(save_causes, partial);
        store.init(&mut explanation, 0);
        (store, explanation, pool)
    }

    fn enumerated_domains() -> TestDomains {
        TestDomains::default().with_enumerated(var(0), 0, 6)
    }

    #[test]
    fn a_full_domain_rule_matches_every_event_kind() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        assert!(store.add_full_domain_rule(var(0)));
        let mask = store.mask(var(0)).unwrap();
        assert_eq!(mask, Rules::FULL_DOMAIN);

        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 4, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::LowerBound, 1, 0, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::UpperBound, 4, 6, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Removal, 5, -1, -1, &domains));
    }

    #[test]
    fn a_lower_bound_rule_matches_lower_bound_events() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        assert!(store.add_lower_bound_rule(var(0)));
        let mask = store.mask(var(0)).unwrap();
        assert_eq!(mask, Rules::LOWER_BOUND);

        assert!(store.matches_domain(mask, var(0), EventKind::LowerBound, 1, 0, -1, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::UpperBound, 4, 6, -1, &domains));

        // An instantiation hides a lower bound move iff the value is above
        // the old lower bound.
        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 4, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 3, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::Assign, 3, 3, 4, &domains));

        // A removal touches the lower bound iff it lies below it.
        assert!(!store.matches_domain(mask, var(0), EventKind::Removal, 3, -1, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Removal, -1, -1, -1, &domains));
    }

    #[test]
    fn an_upper_bound_rule_matches_upper_bound_events() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        assert!(store.add_upper_bound_rule(var(0)));
        let mask = store.mask(var(0)).unwrap();
        assert_eq!(mask, Rules::UPPER_BOUND);

        assert!(store.matches_domain(mask, var(0), EventKind::UpperBound, 4, 6, -1, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::LowerBound, 1, 0, -1, &domains));

        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 4, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 3, 4, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 3, &domains));

        assert!(!store.matches_domain(mask, var(0), EventKind::Removal, -1, -1, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Removal, 7, -1, -1, &domains));
    }

    #[test]
    fn combined_bound_rules_match_all_bound_events() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        assert!(store.add_lower_bound_rule(var(0)));
        assert!(store.add_upper_bound_rule(var(0)));
        let mask = store.mask(var(0)).unwrap();
        assert_eq!(mask, Rules::BOTH_BOUNDS);

        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 1, 4, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::LowerBound, 1, 0, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::UpperBound, 4, 6, -1, &domains));

        // A removal only counts as a bound event outside the current bounds.
        assert!(!store.matches_domain(mask, var(0), EventKind::Removal, 3, -1, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Removal, -1, -1, -1, &domains));
        assert!(store.matches_domain(mask, var(0), EventKind::Removal, 7, -1, -1, &domains));
    }

    #[test]
    fn a_removal_rule_matches_through_the_tracked_set() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        assert!(store.add_removal_rule(var(0), 5, &domains));
        let mask = store.mask(var(0)).unwrap();
        assert_eq!(mask, Rules::REMOVAL);

        assert!(store.matches_domain(mask, var(0), EventKind::Removal, 5, -1, -1, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::Removal, 4, -1, -1, &domains));

        // The instantiation discarded [4, 6], which contains the tracked 5.
        assert!(store.matches_domain(mask, var(0), EventKind::Assign, 3, 4, 6, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::Assign, 3, 0, 4, &domains));

        // Upper bound dropped from 6 to 4: [4, 6] contains 5.
        assert!(store.matches_domain(mask, var(0), EventKind::UpperBound, 4, 6, -1, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::UpperBound, 1, 3, -1, &domains));

        // Lower bound raised from 4 to 6: [4, 6] contains 5.
        assert!(store.matches_domain(mask, var(0), EventKind::LowerBound, 6, 4, -1, &domains));
        assert!(!store.matches_domain(mask, var(0), EventKind::LowerBound, 3, 1, -1, &domains));
    }

    #[test]
    fn removal_rules_on_bounded_variables_become_bound_rules() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = TestDomains::default().with_bounded(var(1), 2, 8);

        assert!(store.add_removal_rule(var(1), 2, &domains));
        assert_eq!(store.mask(var(1)), Some(Rules::LOWER_BOUND));

        assert!(store.add_removal_rule(var(1), 9, &domains));
        assert_eq!(store.mask(var(1)), Some(Rules::BOTH_BOUNDS));
    }

    #[test]
    #[should_panic(expected = "internal consistency error")]
    fn a_removal_rule_for_an_interior_value_of_a_bounded_variable_is_fatal() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = TestDomains::default().with_bounded(var(1), 2, 8);

        let _ = store.add_removal_rule(var(1), 5, &domains);
    }

    #[test]
    #[should_panic(expected = "no rule semantics")]
    fn an_unknown_mask_is_fatal() {
        let (store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();

        let _ = store.matches_domain(2, var(0), EventKind::Removal, 5, -1, -1, &domains);
    }

    #[test]
    #[should_panic(expected = "no rule semantics")]
    fn a_removal_mask_on_a_bounded_variable_is_fatal_in_matching() {
        let (store, _expl, _pool) = store_with_session(true, true);
        let domains = TestDomains::default().with_bounded(var(1), 2, 8);

        let _ = store.matches_domain(Rules::REMOVAL, var(1), EventKind::Removal, 5, -1, -1, &domains);
    }

    #[test]
    fn events_without_a_rule_do_not_match() {
        let (mut store, _expl, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();
        let mut events = EventStore::default();
        let _ = events.push_event(
            var(0),
            Cause::Propagator(PropagatorId(1)),
            EventKind::Removal,
            5,
            -1,
            -1,
        );

        assert!(!store.matches(0, &events, &domains));
    }

    #[test]
    fn activation_events_match_through_activation_rules() {
        let (mut store, mut explanation, _pool) = store_with_session(true, true);
        let domains = enumerated_domains();
        let mut events = EventStore::default();
        let _ = events.push_event(
            var(3),
            Cause::Propagator(PropagatorId(9)),
            EventKind::Activation,
            9,
            -1,
            -1,
        );

        assert!(!store.matches(0, &events, &domains));

        assert!(store.add_activation_rule(PropagatorId(9)));
        assert!(store.matches(0, &events, &domains));

        // Explaining the activation subsumes the activation rule with a
        // full-domain rule on the triggering variable.
        let path = TestPath::with_root(0);
        let explainers = UniformExplainers(SilentExplainer);
        let context = ExplainContext {
            domains: &domains,
            path: &path,
            explainers: &explainers,
        };
        store.update(0, &events, &mut explanation, &context);

        assert_eq!(store.mask(var(3)), Some(Rules::FULL_DOMAIN));
        assert!(!store.matches(0, &events, &domains));
    }

    #[test]
    fn the_refutation_cache_grows_on_demand() {
        let mut pool = ExplanationPool::default();
        let mut store = RuleStore::new(false, false);

        assert!(!store.has_refutation(40));
        store.store_refutation(40, pool.acquire(false));
        assert!(store.has_refutation(40));
        assert_eq!(store.refutation(40).decision_count(), 0);
    }

    #[test]
    fn refutations_move_towards_the_root_and_clear_the_source() {
        let mut pool = ExplanationPool::default();
        let mut store = RuleStore::new(false, false);
        let mut explanation = pool.acquire(false);
        explanation.add_decision(3);
        store.store_refutation(7, explanation);

        store.move_refutation(7, 4);

        assert!(!store.has_refutation(7));
        assert!(store.has_refutation(4));
        assert!(store.refutation(4).decisions().contains(3));
    }

    #[test]
    fn moving_a_refutation_to_its_own_slot_is_a_no_op() {
        let mut pool = ExplanationPool::default();
        let mut store = RuleStore::new(false, false);
        store.store_refutation(5, pool.acquire(false));

        store.move_refutation(5, 5);

        assert!(store.has_refutation(5));
    }

    #[test]
    fn freeing_recycles_into_the_pool() {
        let mut pool = ExplanationPool::default();
        let mut store = RuleStore::new(false, false);
        store.store_refutation(2, pool.acquire(false));
        assert_eq!(pool.available(), 0);

        store.free_refutation(2, &mut pool);

        assert!(!store.has_refutation(2));
        assert_eq!(pool.available(), 1);

        // Freeing an empty or out-of-range slot is harmless.
        store.free_refutation(2, &mut pool);
        store.free_refutation(500, &mut pool);
    }

    #[test]
    #[should_panic(expected = "never explained")]
    fn reading_a_missing_refutation_is_fatal() {
        let store = RuleStore::new(false, false);

        let _ = store.refutation(7);
    }

    #[test]
    fn clearing_resets_the_scan_state_but_keeps_refutations() {
        let mut pool = ExplanationPool::default();
        let (mut store, _expl, _session_pool) = store_with_session(true, true);
        let _ = store.add_full_domain_rule(var(0));
        store.store_refutation(3, pool.acquire(false));

        store.clear(1);

        assert_eq!(store.mask(var(0)), None);
        assert!(store.has_refutation(3));
    }
}
