use enumset::EnumSetType;

/// The kind of an entry in the event log.
///
/// The first four kinds are domain modifications; the payload slots of the
/// corresponding event depend on the kind (see
/// [`EventStore`](crate::explanations::EventStore)). [`EventKind::Activation`]
/// records that a propagator became active, with the propagator id in the
/// first slot.
#[derive(EnumSetType, Debug)]
pub enum EventKind {
    /// A single value was removed from a domain.
    Removal,
    /// A lower bound was increased.
    LowerBound,
    /// An upper bound was decreased.
    UpperBound,
    /// A variable was instantiated to a single value.
    Assign,
    /// A propagator became active.
    Activation,
}
