use fixedbitset::FixedBitSet;

use crate::basic_types::PropagatorId;
use crate::basic_types::VariableId;
use crate::calabash_assert_moderate;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// The dynamically maintained set of rules describing which logged events
/// are relevant to the explanation under construction.
///
/// Three components: a per-variable modification mask, a per-propagator
/// activation bitset, and per-variable sets of explicitly tracked removed
/// values (only populated for variables with enumerated domains).
///
/// Masks are only ever combined with bitwise OR, so matching power never
/// decreases. The numeric values of the mask constants are load-bearing:
/// `FULL_DOMAIN` is a superset of `BOTH_BOUNDS`, which is the union of
/// `LOWER_BOUND` and `UPPER_BOUND`, each of which subsumes `REMOVAL`.
#[derive(Clone, Debug, Default)]
pub struct Rules {
    /// Rule mask per variable id; `0` means no rule recorded.
    variable_masks: Vec<u8>,
    /// Propagator ids whose activation event must be retained.
    activation_rules: FixedBitSet,
    /// Explicitly tracked removed values per variable.
    removed_values: KeyedVec<VariableId, Option<HashSet<i32>>>,
}

impl Rules {
    /// Retain events that remove a tracked value.
    pub const REMOVAL: u8 = 1;
    /// Retain events that touch the lower bound.
    pub const LOWER_BOUND: u8 = 3;
    /// Retain events that touch the upper bound.
    pub const UPPER_BOUND: u8 = 5;
    /// Retain events that touch either bound.
    pub const BOTH_BOUNDS: u8 = 7;
    /// Retain every event on the variable.
    pub const FULL_DOMAIN: u8 = 15;

    /// OR `mask` into the variable's current mask, lazily growing the
    /// backing storage. Returns true iff new bits were added.
    pub fn put_mask(&mut self, variable: VariableId, mask: u8) -> bool {
        calabash_assert_moderate!(
            mask != 0 && mask <= Rules::FULL_DOMAIN,
            "not a rule mask: {mask}"
        );
        let index = variable.index();
        if index >= self.variable_masks.len() {
            self.variable_masks.resize(index + 1, 0);
        }

        let old = self.variable_masks[index];
        self.variable_masks[index] = old | mask;
        self.variable_masks[index] != old
    }

    /// The mask recorded for the variable, or `None` when no rule exists.
    pub fn mask(&self, variable: VariableId) -> Option<u8> {
        self.variable_masks
            .get(variable.index())
            .copied()
            .filter(|&mask| mask != 0)
    }

    /// Record that the activation of this propagator must be retained.
    /// Returns true iff the rule was not already present.
    pub fn add_activation_rule(&mut self, propagator: PropagatorId) -> bool {
        let index = propagator.index();
        if index >= self.activation_rules.len() {
            self.activation_rules.grow(index + 1);
        }
        !self.activation_rules.put(index)
    }

    pub fn has_activation_rule(&self, propagator: PropagatorId) -> bool {
        self.activation_rules.contains(propagator.index())
    }

    pub fn clear_activation_rule(&mut self, propagator: PropagatorId) {
        let index = propagator.index();
        if index < self.activation_rules.len() {
            self.activation_rules.set(index, false);
        }
    }

    /// The tracked removed values of the variable, if any have been recorded.
    pub fn removed_values(&self, variable: VariableId) -> Option<&HashSet<i32>> {
        self.removed_values
            .get(variable)
            .and_then(Option::as_ref)
            .filter(|set| !set.is_empty())
    }

    /// The mutable set of tracked removed values, created on first access.
    pub fn removed_values_mut(&mut self, variable: VariableId) -> &mut HashSet<i32> {
        self.removed_values.accomodate(variable, None);
        self.removed_values[variable].get_or_insert_with(HashSet::default)
    }

    /// True iff any integer in `[lower, upper]` is a tracked removed value of
    /// the variable.
    ///
    /// The caller must have established that the variable has a non-empty
    /// removed-value set; calling this without one means the rule bookkeeping
    /// has desynchronized from the event log.
    pub fn intersects(&self, lower: i32, upper: i32, variable: VariableId) -> bool {
        let set = self.removed_values(variable).unwrap_or_else(|| {
            panic!("internal consistency error: no tracked removals for {variable}")
        });

        let range_len = (upper as i64 - lower as i64 + 1).max(0) as usize;
        if set.len() < range_len {
            set.iter().any(|&value| lower <= value && value <= upper)
        } else {
            (lower..=upper).any(|value| set.contains(&value))
        }
    }

    /// OR every component of `other` into `self`.
    pub fn merge_from(&mut self, other: &Rules) {
        for (index, &mask) in other.variable_masks.iter().enumerate() {
            if mask != 0 {
                let _ = self.put_mask(VariableId::create_from_index(index), mask);
            }
        }

        self.activation_rules.union_with(&other.activation_rules);

        for (index, set) in other.removed_values.iter().enumerate() {
            if let Some(set) = set {
                if !set.is_empty() {
                    self.removed_values_mut(VariableId::create_from_index(index))
                        .extend(set.iter().copied());
                }
            }
        }
    }

    /// Reset all three components, keeping backing storage for reuse.
    pub fn clear(&mut self) {
        self.variable_masks.fill(0);
        self.activation_rules.clear();
        for set in self.removed_values.iter_mut() {
            if let Some(set) = set {
                set.clear();
            }
        }
    }
}
