use crate::basic_types::Predicate;
use crate::calabash_assert_simple;
use crate::explanations::Explanation;
use crate::search::DecisionPath;

/// The external store in which learned clauses are persisted.
pub trait NogoodStore {
    /// Register `literals` as a learned clause (a disjunction that prevents
    /// repeating a proven-infeasible partial assignment).
    fn post_nogood(&mut self, literals: &[Predicate]);
}

impl Explanation {
    /// Emit this explanation as a nogood.
    ///
    /// Walks the decision bitset from the most recent implicated world down
    /// to the root and appends the negated literal of every implicated left
    /// decision to `buffer`, then posts the buffer to `store`. Only complete
    /// explanations can be emitted.
    pub fn post_nogood(
        &self,
        path: &dyn DecisionPath,
        store: &mut dyn NogoodStore,
        buffer: &mut Vec<Predicate>,
    ) {
        calabash_assert_simple!(
            self.is_complete(),
            "nogoods can only be extracted from a complete explanation"
        );

        buffer.clear();
        for world in (0..self.decisions().len()).rev() {
            if !self.decisions().contains(world) {
                continue;
            }
            let decision = path.decision(world as u32);
            if decision.has_next() {
                buffer.push(
                    Predicate::Equality {
                        variable: decision.variable(),
                        value: decision.value(),
                    }
                    .negate(),
                );
            }
        }

        store.post_nogood(buffer);
    }
}
