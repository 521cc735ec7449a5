use crate::basic_types::Cause;
use crate::basic_types::PropagatorId;
use crate::basic_types::VariableId;

/// The notification surface through which the propagation engine reports
/// every domain change.
///
/// Implementations only perform bookkeeping (appending to an event log) and
/// must not fail; the methods are called synchronously from the propagation
/// hot path.
pub trait DomainEventObserver {
    /// `value` was removed from the domain of `variable`.
    fn on_remove_value(&mut self, variable: VariableId, value: i32, cause: Cause);

    /// The lower bound of `variable` was raised from `old_lower_bound` to
    /// `new_lower_bound`.
    fn on_update_lower_bound(
        &mut self,
        variable: VariableId,
        new_lower_bound: i32,
        old_lower_bound: i32,
        cause: Cause,
    );

    /// The upper bound of `variable` was lowered from `old_upper_bound` to
    /// `new_upper_bound`.
    fn on_update_upper_bound(
        &mut self,
        variable: VariableId,
        new_upper_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    );

    /// `variable` was instantiated to `value`; its domain was
    /// `[old_lower_bound, old_upper_bound]` beforehand.
    fn on_instantiate(
        &mut self,
        variable: VariableId,
        value: i32,
        old_lower_bound: i32,
        old_upper_bound: i32,
        cause: Cause,
    );

    /// `propagator` became active, triggered through `variable`.
    fn on_propagator_activated(&mut self, variable: VariableId, propagator: PropagatorId);
}
