use crate::basic_types::PropagatorId;
use crate::basic_types::VariableId;

/// A propagation failure, the input to
/// [`explain`](crate::explanations::ExplanationEngine::explain).
///
/// A contradiction is expected control flow for the explanation engine, not
/// an error of this subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contradiction {
    /// The domain of this variable became empty.
    EmptyDomain(VariableId),
    /// This propagator found the current state inconsistent without a single
    /// variable to blame.
    Propagator(PropagatorId),
}
