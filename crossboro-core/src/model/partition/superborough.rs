use serde::{Deserialize, Serialize};

use super::Borough;

/// code reserved for "no assigned partition".
pub const UNASSIGNED_CODE: u8 = 0;

/// number of superborough partitions, each of which owns one trained duration model.
pub const N_SUPERBOROUGHS: usize = 3;

/// a coarse partition of the city. each partition is a fixed set of boroughs
/// and scopes which per-partition duration model applies to a trip.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Superborough {
    /// code 1: Manhattan, EWR and the Bronx
    ManhattanEwrBronx,
    /// code 2: Brooklyn and Queens
    BrooklynQueens,
    /// code 3: Staten Island
    StatenIsland,
}

impl Superborough {
    pub const ALL: [Superborough; N_SUPERBOROUGHS] = [
        Superborough::ManhattanEwrBronx,
        Superborough::BrooklynQueens,
        Superborough::StatenIsland,
    ];

    /// the partition owning a borough. every borough belongs to exactly one partition.
    pub fn of(borough: Borough) -> Superborough {
        match borough {
            Borough::Manhattan | Borough::Ewr | Borough::Bronx => Superborough::ManhattanEwrBronx,
            Borough::Brooklyn | Borough::Queens => Superborough::BrooklynQueens,
            Borough::StatenIsland => Superborough::StatenIsland,
        }
    }

    /// the boroughs grouped into this partition
    pub fn boroughs(&self) -> &'static [Borough] {
        match self {
            Superborough::ManhattanEwrBronx => &[Borough::Manhattan, Borough::Ewr, Borough::Bronx],
            Superborough::BrooklynQueens => &[Borough::Brooklyn, Borough::Queens],
            Superborough::StatenIsland => &[Borough::StatenIsland],
        }
    }

    /// numeric code in [1, 3]
    pub fn code(&self) -> u8 {
        match self {
            Superborough::ManhattanEwrBronx => 1,
            Superborough::BrooklynQueens => 2,
            Superborough::StatenIsland => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Superborough> {
        match code {
            1 => Some(Superborough::ManhattanEwrBronx),
            2 => Some(Superborough::BrooklynQueens),
            3 => Some(Superborough::StatenIsland),
            _ => None,
        }
    }

    /// position of this partition in fixed-size per-partition collections
    pub fn index(&self) -> usize {
        self.code() as usize - 1
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Superborough::ManhattanEwrBronx => "MEBx",
            Superborough::BrooklynQueens => "BkQ",
            Superborough::StatenIsland => "St",
        }
    }
}

impl std::fmt::Display for Superborough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code(), self.abbreviation())
    }
}

/// partition registry lookup. a location outside of every borough has no
/// partition, which is represented by None (the sentinel) rather than an error.
pub fn superborough_of(borough: Option<Borough>) -> Option<Superborough> {
    borough.map(Superborough::of)
}

/// renders an optional partition as its numeric code, using [`UNASSIGNED_CODE`] for None.
pub fn superborough_code(superborough: Option<Superborough>) -> u8 {
    superborough
        .map(|sb| sb.code())
        .unwrap_or(UNASSIGNED_CODE)
}

/// an unordered pair of partitions. the pair is stored sorted so that (a, b)
/// and (b, a) share a key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuperboroughPair(Superborough, Superborough);

impl SuperboroughPair {
    pub fn new(a: Superborough, b: Superborough) -> SuperboroughPair {
        if a <= b {
            SuperboroughPair(a, b)
        } else {
            SuperboroughPair(b, a)
        }
    }

    /// every pair of distinct partitions
    pub fn all_crossings() -> Vec<SuperboroughPair> {
        use itertools::Itertools;
        Superborough::ALL
            .iter()
            .tuple_combinations()
            .map(|(a, b)| SuperboroughPair::new(*a, *b))
            .collect_vec()
    }

    pub fn first(&self) -> Superborough {
        self.0
    }

    pub fn second(&self) -> Superborough {
        self.1
    }

    pub fn is_crossing(&self) -> bool {
        self.0 != self.1
    }
}

impl std::fmt::Display for SuperboroughPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.0.code(), self.1.code())
    }
}
