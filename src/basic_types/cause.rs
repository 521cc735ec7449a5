use bitfield_struct::bitfield;

use crate::basic_types::PropagatorId;
use crate::calabash_assert_simple;

const TAG_DECISION: u8 = 0;
const TAG_PROPAGATOR: u8 = 1;

/// Why a domain event happened: either a search decision or a propagator.
///
/// A closed union with an explicit discriminant, so that dispatching on the
/// cause of an event is an exhaustive match.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Cause {
    /// The event was produced by the decision taken at this world index.
    Decision(u32),
    /// The event was produced by a propagator.
    Propagator(PropagatorId),
}

/// The one-word representation of a [`Cause`] stored in the event log.
#[bitfield(u32)]
pub(crate) struct PackedCause {
    #[bits(2)]
    tag: u8,
    #[bits(30)]
    payload: u32,
}

impl Cause {
    pub(crate) fn pack(self) -> PackedCause {
        match self {
            Cause::Decision(world) => {
                calabash_assert_simple!(world < (1 << 30), "world index does not fit in a cause");
                PackedCause::new().with_tag(TAG_DECISION).with_payload(world)
            }
            Cause::Propagator(propagator) => {
                calabash_assert_simple!(
                    propagator.0 < (1 << 30),
                    "propagator id does not fit in a cause"
                );
                PackedCause::new()
                    .with_tag(TAG_PROPAGATOR)
                    .with_payload(propagator.0)
            }
        }
    }

    pub(crate) fn unpack(packed: PackedCause) -> Self {
        match packed.tag() {
            TAG_DECISION => Cause::Decision(packed.payload()),
            TAG_PROPAGATOR => Cause::Propagator(PropagatorId(packed.payload())),
            tag => panic!("internal consistency error: unknown cause tag {tag}"),
        }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::Decision(world) => write!(f, "decision@{world}"),
            Cause::Propagator(propagator) => write!(f, "{propagator}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn causes_survive_a_packing_round_trip() {
        let causes = [
            Cause::Decision(0),
            Cause::Decision(41),
            Cause::Propagator(PropagatorId(7)),
            Cause::Propagator(PropagatorId((1 << 30) - 1)),
        ];

        for cause in causes {
            assert_eq!(Cause::unpack(cause.pack()), cause);
        }
    }
}
