use crate::basic_types::VariableId;

/// A choice point in the search tree, as seen by the explanation engine.
///
/// A decision is a LEFT branch while an untried alternative remains
/// ([`Decision::has_next`] is true) and becomes a RIGHT branch (the
/// refutation of the left choice) once it flips. The root sentinel is the
/// one decision whose [`Decision::previous`] is `None`.
pub trait Decision {
    /// The world index at which this decision was taken, a monotonically
    /// increasing identifier for a point in the backtracking timeline.
    fn world_index(&self) -> u32;

    /// True while an untried alternative remains, i.e. this is a left branch.
    fn has_next(&self) -> bool;

    fn previous(&self) -> Option<&dyn Decision>;

    fn variable(&self) -> VariableId;

    fn value(&self) -> i32;
}

/// Resolves world indices back to decisions during a scan.
pub trait DecisionPath {
    /// The decision taken at `world_index`.
    ///
    /// Only called for world indices that occur as the cause of a logged
    /// event, which are live by construction.
    fn decision(&self, world_index: u32) -> &dyn Decision;

    /// The world index below the first real decision of the current search.
    /// The decision at this index is the root sentinel and is never
    /// implicated in an explanation.
    fn root_world_index(&self) -> u32;
}
