use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use crate::basic_types::EventKind;
use crate::basic_types::PropagatorId;
use crate::basic_types::ReadDomains;
use crate::basic_types::VariableId;
use crate::explanations::RuleStore;

/// The explanation callback of a propagator: the designed extension point
/// where constraint-specific inference grows the rule set.
///
/// When the backward scan meets an event caused by a propagator, it invokes
/// [`Explainer::why`] on that propagator, which must describe which events
/// on its own input variables are relevant by calling the `add_*_rule`
/// methods of the given [`RuleStore`]. The callback must be synchronous and
/// non-blocking; transitive inference happens naturally when rules it adds
/// match older events on later scan iterations.
pub trait Explainer: Downcast {
    /// Explain the modification of `variable` by event `kind` with payload
    /// `value`.
    ///
    /// For a contradiction that does not name a variable, the engine invokes
    /// this once with `variable` and `kind` absent and `value` set to
    /// [`NO_VALUE`](crate::explanations::NO_VALUE).
    fn why(
        &self,
        rules: &mut RuleStore,
        domains: &dyn ReadDomains,
        variable: Option<VariableId>,
        kind: Option<EventKind>,
        value: i32,
    );
}

impl_downcast!(Explainer);

/// Resolves propagator ids to their [`Explainer`]s during a scan.
pub trait ExplainerRegistry {
    fn explainer(&self, propagator: PropagatorId) -> &dyn Explainer;
}
