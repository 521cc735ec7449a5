use crate::basic_types::Cause;
use crate::basic_types::EventKind;
use crate::basic_types::PackedCause;
use crate::basic_types::VariableId;

/// Filler for payload slots that an event kind does not use.
pub const NO_VALUE: i32 = -1;

/// A materialized read-only view of one log entry.
///
/// The backward scan reads individual fields through the accessors on
/// [`EventStore`]; this struct exists for callers that want the whole entry
/// at once (tests, debugging, replay).
#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub variable: VariableId,
    pub cause: Cause,
    pub kind: EventKind,
    pub first: i32,
    pub second: i32,
    pub third: i32,
    pub index: usize,
}

/// An append-only, indexable log of domain-modification events.
///
/// Entries are stored column-wise so that the backward scan can read the one
/// or two fields it needs without materializing a whole entry. The meaning
/// of the three payload slots depends on the event kind:
///
/// | kind                     | first          | second | third  |
/// |--------------------------|----------------|--------|--------|
/// | [`EventKind::Removal`]   | removed value  | unused | unused |
/// | [`EventKind::LowerBound`]| new lb         | old lb | unused |
/// | [`EventKind::UpperBound`]| new ub         | old ub | unused |
/// | [`EventKind::Assign`]    | value          | old lb | old ub |
/// | [`EventKind::Activation`]| propagator id  | unused | unused |
///
/// `push_event` is the sole mutator apart from [`EventStore::clear`], which
/// is invoked by the owner of the search at world boundaries. Indexing out
/// of range is a programmer error and panics.
#[derive(Default, Debug)]
pub struct EventStore {
    variables: Vec<VariableId>,
    causes: Vec<PackedCause>,
    kinds: Vec<EventKind>,
    firsts: Vec<i32>,
    seconds: Vec<i32>,
    thirds: Vec<i32>,
}

impl EventStore {
    /// Append an event, returning its index in the log.
    pub fn push_event(
        &mut self,
        variable: VariableId,
        cause: Cause,
        kind: EventKind,
        first: i32,
        second: i32,
        third: i32,
    ) -> usize {
        self.variables.push(variable);
        self.causes.push(cause.pack());
        self.kinds.push(kind);
        self.firsts.push(first);
        self.seconds.push(second);
        self.thirds.push(third);

        self.variables.len() - 1
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variable(&self, index: usize) -> VariableId {
        self.variables[index]
    }

    pub fn cause(&self, index: usize) -> Cause {
        Cause::unpack(self.causes[index])
    }

    pub fn kind(&self, index: usize) -> EventKind {
        self.kinds[index]
    }

    pub fn first_value(&self, index: usize) -> i32 {
        self.firsts[index]
    }

    pub fn second_value(&self, index: usize) -> i32 {
        self.seconds[index]
    }

    pub fn third_value(&self, index: usize) -> i32 {
        self.thirds[index]
    }

    pub fn event(&self, index: usize) -> Event {
        Event {
            variable: self.variable(index),
            cause: self.cause(index),
            kind: self.kind(index),
            first: self.first_value(index),
            second: self.second_value(index),
            third: self.third_value(index),
            index,
        }
    }

    pub fn clear(&mut self) {
        self.variables.clear();
        self.causes.clear();
        self.kinds.clear();
        self.firsts.clear();
        self.seconds.clear();
        self.thirds.clear();
    }
}
