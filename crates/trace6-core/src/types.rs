use derive_more::{Add, AddAssign};

/// `TimeToLive` (hop limit) newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, AddAssign)]
pub struct TimeToLive(pub u8);

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, AddAssign)]
pub struct Sequence(pub u16);

/// `TraceId` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct TraceId(pub u16);

/// `MaxHops` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxHops(pub u8);

/// `ProbeAttempts` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct ProbeAttempts(pub u8);

/// Per-attempt generation token newtype.
///
/// Bumped before every send so that an outcome produced for an attempt which
/// has already been decided can be told apart from the outcome of the
/// current attempt, even when sequence numbers would collide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Add, AddAssign)]
pub struct Generation(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_add() {
        let mut sequence = Sequence(0);
        sequence += Sequence(1);
        assert_eq!(Sequence(1), sequence);
        assert_eq!(Sequence(3), sequence + Sequence(2));
    }

    #[test]
    fn test_generation_add() {
        let mut generation = Generation(u64::from(u32::MAX));
        generation += Generation(1);
        assert_eq!(Generation(4_294_967_296), generation);
    }
}
