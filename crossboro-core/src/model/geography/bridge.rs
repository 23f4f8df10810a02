use serde::{Deserialize, Serialize};

/// taxi zone identifier
pub type LocationId = u32;

/// a crossing point between two partitions, as a pair of adjacent zones on
/// either side of it. the pair is unordered; the stored order is the order the
/// store returned, which matters when resolving which side a trip starts on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bridge {
    pub first: LocationId,
    pub second: LocationId,
}

impl Bridge {
    pub fn new(first: LocationId, second: LocationId) -> Bridge {
        Bridge { first, second }
    }

    /// order-independent identity of this bridge
    pub fn key(&self) -> (LocationId, LocationId) {
        if self.first <= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }
}

impl std::fmt::Display for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}", self.first, self.second)
    }
}
