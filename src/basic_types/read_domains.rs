use crate::basic_types::VariableId;

/// Read access to the current variable domains.
///
/// The explanation engine never owns domains; the solver passes a view into
/// every call that needs one. Rule matching only requires the current bounds
/// and whether a domain is enumerated (holes are representable) or bounded
/// (an interval).
pub trait ReadDomains {
    fn lower_bound(&self, variable: VariableId) -> i32;

    fn upper_bound(&self, variable: VariableId) -> i32;

    /// Whether individual values can be removed from the inside of this
    /// variable's domain. Removal rules are only meaningful for such
    /// variables; for bounded variables they degrade to bound rules.
    fn has_enumerated_domain(&self, variable: VariableId) -> bool;
}
