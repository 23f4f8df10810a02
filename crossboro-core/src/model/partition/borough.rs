use serde::{Deserialize, Serialize};

/// number of slots in a borough one-hot segment of a feature vector.
pub const BOROUGH_SLOTS: usize = 6;

/// one of the borough groupings that a taxi zone belongs to. each borough
/// carries a one-hot label in [1, 6] which matches the enumeration used when
/// the feature vectors were written.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Borough {
    Bronx,
    Brooklyn,
    #[serde(rename = "EWR")]
    Ewr,
    Manhattan,
    Queens,
    #[serde(rename = "Staten Island")]
    StatenIsland,
}

impl Borough {
    /// all boroughs in one-hot label order
    pub const ALL: [Borough; BOROUGH_SLOTS] = [
        Borough::Bronx,
        Borough::Brooklyn,
        Borough::Ewr,
        Borough::Manhattan,
        Borough::Queens,
        Borough::StatenIsland,
    ];

    /// the one-hot label of this borough, in [1, 6]
    pub fn label(&self) -> usize {
        match self {
            Borough::Bronx => 1,
            Borough::Brooklyn => 2,
            Borough::Ewr => 3,
            Borough::Manhattan => 4,
            Borough::Queens => 5,
            Borough::StatenIsland => 6,
        }
    }

    /// inverse of [`Borough::label`]. labels outside of [1, 6] have no borough.
    pub fn from_label(label: usize) -> Option<Borough> {
        label
            .checked_sub(1)
            .and_then(|idx| Borough::ALL.get(idx))
            .copied()
    }

    /// the name used by the location table of the store
    pub fn name(&self) -> &'static str {
        match self {
            Borough::Bronx => "Bronx",
            Borough::Brooklyn => "Brooklyn",
            Borough::Ewr => "EWR",
            Borough::Manhattan => "Manhattan",
            Borough::Queens => "Queens",
            Borough::StatenIsland => "Staten Island",
        }
    }

    /// parses a borough name from the store. zones labeled "Unknown" or "N/A"
    /// are not part of any borough and produce None.
    pub fn from_name(name: &str) -> Option<Borough> {
        Borough::ALL
            .iter()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
            .copied()
    }
}

impl std::fmt::Display for Borough {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::Borough;

    #[test]
    fn test_label_roundtrip() {
        for borough in Borough::ALL {
            assert_eq!(Borough::from_label(borough.label()), Some(borough));
        }
        assert_eq!(Borough::from_label(0), None);
        assert_eq!(Borough::from_label(7), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Borough::from_name("Staten Island"), Some(Borough::StatenIsland));
        assert_eq!(Borough::from_name("ewr"), Some(Borough::Ewr));
        assert_eq!(Borough::from_name("Unknown"), None);
    }
}
