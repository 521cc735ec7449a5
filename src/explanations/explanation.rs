use fixedbitset::FixedBitSet;
use itertools::Itertools;

use crate::basic_types::Cause;
use crate::calabash_assert_moderate;
use crate::containers::HashSet;
use crate::explanations::Rules;

/// The computed account of a conflict: the set of causing agents, a bitset
/// of implicated decision world-indices, and, while the explanation is still
/// in progress, the rule set driving the backward scan.
///
/// An explanation is complete once its rule set has been detached
/// ([`Explanation::is_complete`]); only complete explanations may be turned
/// into nogoods. Instances are pooled: they are created through
/// [`ExplanationPool::acquire`] and handed back with
/// [`ExplanationPool::recycle`], which consumes the instance so a recycled
/// explanation cannot be touched again.
#[derive(Debug)]
pub struct Explanation {
    causes: HashSet<Cause>,
    decisions: FixedBitSet,
    last_event_index: usize,
    rules: Option<Rules>,
    save_causes: bool,
}

impl Explanation {
    fn empty() -> Explanation {
        Explanation {
            causes: HashSet::default(),
            decisions: FixedBitSet::default(),
            last_event_index: 0,
            rules: None,
            save_causes: false,
        }
    }

    /// Record a causing agent. A no-op returning false unless cause saving
    /// was enabled when this explanation was acquired; otherwise returns
    /// true iff the cause was newly inserted.
    pub fn add_cause(&mut self, cause: Cause) -> bool {
        if !self.save_causes {
            return false;
        }
        self.causes.insert(cause)
    }

    pub fn remove_cause(&mut self, cause: Cause) -> bool {
        self.causes.remove(&cause)
    }

    /// Mark the decision at this world index as implicated. Bits are only
    /// ever added during a scan.
    pub fn add_decision(&mut self, world_index: u32) {
        let index = world_index as usize;
        if index >= self.decisions.len() {
            self.decisions.grow(index + 1);
        }
        self.decisions.insert(index);
    }

    pub fn remove_decision(&mut self, world_index: u32) {
        let index = world_index as usize;
        if index < self.decisions.len() {
            self.decisions.set(index, false);
        }
    }

    pub fn causes(&self) -> impl Iterator<Item = Cause> + '_ {
        self.causes.iter().copied()
    }

    pub fn cause_count(&self) -> usize {
        self.causes.len()
    }

    pub fn decisions(&self) -> &FixedBitSet {
        &self.decisions
    }

    pub fn decision_count(&self) -> usize {
        self.decisions.count_ones(..)
    }

    /// The nearest world index at or below `world_index` whose decision is
    /// not implicated. `None` when every bit down to zero is set.
    ///
    /// Used for the early-exit criterion when causes are not saved: the
    /// conflict is fully explained by decisions once this returns the root
    /// world index, whose sentinel bit is never set.
    pub fn previous_clear_decision(&self, world_index: u32) -> Option<u32> {
        (0..=world_index).rev().find(|&world| !self.decisions.contains(world as usize))
    }

    /// Union the causes (when saved) and implicated decisions of `other`
    /// into `self`.
    pub fn merge_causes_and_decisions(&mut self, other: &Explanation) {
        if self.save_causes && !other.causes.is_empty() {
            self.causes.extend(other.causes.iter().copied());
        }
        if other.decisions.count_ones(..) > 0 {
            self.decisions.union_with(&other.decisions);
        }
    }

    /// OR `other_rules` into the embedded rule set. Only valid while the
    /// explanation is in progress.
    pub fn merge_rules(&mut self, other_rules: &Rules) {
        self.rules
            .as_mut()
            .expect("internal consistency error: merging rules into a complete explanation")
            .merge_from(other_rules);
    }

    /// True iff the rule set has been detached, i.e. the backward scan that
    /// produced this explanation has concluded.
    pub fn is_complete(&self) -> bool {
        self.rules.is_none()
    }

    pub fn rules(&self) -> Option<&Rules> {
        self.rules.as_ref()
    }

    /// The event index at which the scan stopped, when it was preempted.
    pub fn last_event_index(&self) -> usize {
        self.last_event_index
    }

    pub fn set_last_event_index(&mut self, index: usize) {
        self.last_event_index = index;
    }

    pub fn save_causes(&self) -> bool {
        self.save_causes
    }

    /// A fresh pooled copy of this explanation: causes, decisions and rules
    /// are copied, never aliased.
    pub fn duplicate(&self, pool: &mut ExplanationPool) -> Explanation {
        let mut copy = pool.acquire(self.save_causes);
        copy.merge_causes_and_decisions(self);
        copy.last_event_index = self.last_event_index;
        match &self.rules {
            Some(rules) => copy.merge_rules(rules),
            None => pool.reclaim_rules(copy.rules.take().expect("freshly acquired")),
        }
        copy
    }

    pub(crate) fn take_rules(&mut self) -> Option<Rules> {
        self.rules.take()
    }

    pub(crate) fn install_rules(&mut self, rules: Rules) {
        calabash_assert_moderate!(
            self.rules.is_none(),
            "installing rules over an in-progress explanation"
        );
        self.rules = Some(rules);
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "decisions [{}], {} cause(s), {}",
            self.decisions.ones().format(", "),
            self.causes.len(),
            if self.is_complete() {
                "complete"
            } else {
                "in progress"
            }
        )
    }
}

/// A free-list pool of [`Explanation`] instances.
///
/// Explanations are acquired and recycled once per conflict inside the
/// search loop; the pool keeps both the explanation shells and their rule
/// sets alive so that the backing allocations are reused.
#[derive(Debug, Default)]
pub struct ExplanationPool {
    free: Vec<Explanation>,
    spare_rules: Vec<Rules>,
}

impl ExplanationPool {
    /// Take an explanation from the pool (or allocate one) with cleared
    /// causes and decisions and a cleared, installed rule set.
    pub fn acquire(&mut self, save_causes: bool) -> Explanation {
        let mut explanation = self.free.pop().unwrap_or_else(Explanation::empty);
        explanation.save_causes = save_causes;
        explanation.rules = Some(self.spare_rules.pop().unwrap_or_default());
        explanation
    }

    /// Clear all fields of `explanation` and return it to the pool.
    ///
    /// Consuming the value makes ownership transfer explicit: the caller
    /// cannot retain a reference to a recycled explanation.
    pub fn recycle(&mut self, mut explanation: Explanation) {
        explanation.causes.clear();
        explanation.decisions.clear();
        explanation.last_event_index = 0;
        explanation.save_causes = false;
        if let Some(rules) = explanation.rules.take() {
            self.reclaim_rules(rules);
        }
        self.free.push(explanation);
    }

    /// Return detached rule storage to the pool for reuse.
    pub(crate) fn reclaim_rules(&mut self, mut rules: Rules) {
        rules.clear();
        self.spare_rules.push(rules);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::PropagatorId;
    use crate::basic_types::VariableId;

    fn pooled(save_causes: bool) -> (ExplanationPool, Explanation) {
        let mut pool = ExplanationPool::default();
        let explanation = pool.acquire(save_causes);
        (pool, explanation)
    }

    #[test]
    fn decisions_only_ever_grow_during_a_scan() {
        let (_pool, mut explanation) = pooled(false);

        let mut seen = Vec::new();
        for world in [4, 1, 9, 1, 6] {
            explanation.add_decision(world);
            seen.push(world);

            for &world in &seen {
                assert!(explanation.decisions().contains(world as usize));
            }
        }
        assert_eq!(explanation.decision_count(), 4);
    }

    #[test]
    fn removed_decisions_are_no_longer_implicated() {
        let (_pool, mut explanation) = pooled(false);
        explanation.add_decision(3);
        explanation.add_decision(5);

        explanation.remove_decision(3);
        // Removing a decision that was never implicated is harmless.
        explanation.remove_decision(30);

        assert!(!explanation.decisions().contains(3));
        assert!(explanation.decisions().contains(5));
    }

    #[test]
    fn causes_are_not_recorded_unless_saving_is_enabled() {
        let (_pool, mut explanation) = pooled(false);

        assert!(!explanation.add_cause(Cause::Propagator(PropagatorId(1))));
        assert!(!explanation.add_cause(Cause::Decision(2)));
        assert_eq!(explanation.cause_count(), 0);
    }

    #[test]
    fn saved_causes_deduplicate() {
        let (_pool, mut explanation) = pooled(true);
        let cause = Cause::Propagator(PropagatorId(1));

        assert!(explanation.add_cause(cause));
        assert!(!explanation.add_cause(cause));
        assert_eq!(explanation.cause_count(), 1);

        assert!(explanation.remove_cause(cause));
        assert_eq!(explanation.cause_count(), 0);
    }

    #[test]
    fn recycling_yields_a_blank_explanation() {
        let mut pool = ExplanationPool::default();
        let mut explanation = pool.acquire(true);
        let _ = explanation.add_cause(Cause::Propagator(PropagatorId(3)));
        explanation.add_decision(5);
        explanation.set_last_event_index(17);
        let mut extra_rules = Rules::default();
        let _ = extra_rules.put_mask(VariableId::new(0), Rules::FULL_DOMAIN);
        explanation.merge_rules(&extra_rules);

        pool.recycle(explanation);
        assert_eq!(pool.available(), 1);

        let reused = pool.acquire(false);
        assert_eq!(reused.cause_count(), 0);
        assert_eq!(reused.decision_count(), 0);
        assert_eq!(reused.last_event_index(), 0);
        assert!(!reused.is_complete());
        assert_eq!(reused.rules().unwrap().mask(VariableId::new(0)), None);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn merging_unions_decisions_and_saved_causes() {
        let mut pool = ExplanationPool::default();
        let mut target = pool.acquire(true);
        target.add_decision(1);
        let _ = target.add_cause(Cause::Propagator(PropagatorId(0)));

        let mut other = pool.acquire(true);
        other.add_decision(8);
        let _ = other.add_cause(Cause::Propagator(PropagatorId(4)));

        target.merge_causes_and_decisions(&other);

        assert!(target.decisions().contains(1));
        assert!(target.decisions().contains(8));
        assert_eq!(target.cause_count(), 2);
    }

    #[test]
    fn merging_into_a_cause_blind_explanation_keeps_it_cause_free() {
        let mut pool = ExplanationPool::default();
        let mut target = pool.acquire(false);
        let mut other = pool.acquire(true);
        let _ = other.add_cause(Cause::Propagator(PropagatorId(4)));

        target.merge_causes_and_decisions(&other);

        assert_eq!(target.cause_count(), 0);
    }

    #[test]
    fn duplicating_copies_rather_than_aliases() {
        let mut pool = ExplanationPool::default();
        let mut original = pool.acquire(true);
        original.add_decision(2);
        let _ = original.add_cause(Cause::Decision(2));

        let mut copy = original.duplicate(&mut pool);
        copy.add_decision(6);

        assert!(!original.decisions().contains(6));
        assert!(copy.decisions().contains(2));
        assert_eq!(copy.cause_count(), 1);
    }

    #[test]
    fn previous_clear_decision_finds_the_first_gap() {
        let (_pool, mut explanation) = pooled(false);
        for world in [1, 2, 4, 5] {
            explanation.add_decision(world);
        }

        assert_eq!(explanation.previous_clear_decision(5), Some(3));
        assert_eq!(explanation.previous_clear_decision(2), Some(0));
        assert_eq!(explanation.previous_clear_decision(0), Some(0));
    }

    #[test]
    fn gap_free_detection_matches_a_brute_force_check() {
        // The early-exit criterion: at the moment the decision at world `w`
        // is processed, the scan may stop iff every world in
        // (root_world, w] is implicated. Exercise every gap position for
        // several root offsets.
        for root_world in 0..3u32 {
            for highest in root_world + 1..root_world + 6 {
                for gap in root_world + 1..=highest {
                    let (_pool, mut explanation) = pooled(false);
                    for world in root_world + 1..=highest {
                        if world != gap {
                            explanation.add_decision(world);
                        }
                    }

                    let gap_free = (root_world + 1..=highest)
                        .all(|world| explanation.decisions().contains(world as usize));
                    assert_eq!(
                        explanation.previous_clear_decision(highest) == Some(root_world),
                        gap_free,
                        "root {root_world}, highest {highest}, gap {gap}"
                    );
                }

                // No gap at all: the criterion holds.
                let (_pool, mut explanation) = pooled(false);
                for world in root_world + 1..=highest {
                    explanation.add_decision(world);
                }
                assert_eq!(
                    explanation.previous_clear_decision(highest),
                    Some(root_world)
                );
            }
        }
    }
}
