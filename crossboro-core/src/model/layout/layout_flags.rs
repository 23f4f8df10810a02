use serde::{Deserialize, Serialize};

/// version of the positional schema computed by [`super::FeatureLayout`]. bump this
/// whenever an offset changes so that saved datasets written under an older schema
/// are rejected instead of silently misread.
pub const LAYOUT_VERSION: u32 = 1;

/// the three encoding switches that determine the positional schema of a feature vector.
/// these must match the switches that the per-partition models were trained with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct LayoutFlags {
    /// date and time-of-day features are one-hot encoded
    pub datetime_one_hot: bool,
    /// the weekday feature is one-hot encoded
    pub weekdays_one_hot: bool,
    /// pickup and dropoff location ids are included (always one-hot)
    pub location_ids: bool,
}

impl LayoutFlags {
    pub fn new(datetime_one_hot: bool, weekdays_one_hot: bool, location_ids: bool) -> LayoutFlags {
        LayoutFlags {
            datetime_one_hot,
            weekdays_one_hot,
            location_ids,
        }
    }

    /// every flag combination
    pub fn all() -> Vec<LayoutFlags> {
        let mut result = Vec::with_capacity(8);
        for doh in [false, true] {
            for woh in [false, true] {
                for loc in [false, true] {
                    result.push(LayoutFlags::new(doh, woh, loc));
                }
            }
        }
        result
    }

    /// three-character key such as "110", in (datetime, weekdays, location ids) order.
    /// this key names model sets and log files.
    pub fn key(&self) -> String {
        format!(
            "{}{}{}",
            self.datetime_one_hot as u8, self.weekdays_one_hot as u8, self.location_ids as u8
        )
    }

    /// sparse storage is used whenever any one-hot block is present
    pub fn is_sparse(&self) -> bool {
        self.datetime_one_hot || self.weekdays_one_hot || self.location_ids
    }
}

impl std::fmt::Display for LayoutFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// the flags together with the schema version, persisted alongside saved datasets.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutTag {
    pub version: u32,
    #[serde(flatten)]
    pub flags: LayoutFlags,
}

impl LayoutTag {
    /// tag for the current schema version
    pub fn current(flags: LayoutFlags) -> LayoutTag {
        LayoutTag {
            version: LAYOUT_VERSION,
            flags,
        }
    }

    pub fn is_compatible_with(&self, flags: &LayoutFlags) -> bool {
        self.version == LAYOUT_VERSION && &self.flags == flags
    }
}

impl std::fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}:{}", self.version, self.flags.key())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key() {
        assert_eq!(LayoutFlags::new(true, false, true).key(), "101");
        assert_eq!(LayoutFlags::default().key(), "000");
        assert_eq!(LayoutFlags::all().len(), 8);
    }

    #[test]
    fn test_tag_compatibility() {
        let flags = LayoutFlags::new(false, true, true);
        let tag = LayoutTag::current(flags);
        assert!(tag.is_compatible_with(&flags));
        assert!(!tag.is_compatible_with(&LayoutFlags::new(true, true, true)));
        let stale = LayoutTag {
            version: LAYOUT_VERSION + 1,
            flags,
        };
        assert!(!stale.is_compatible_with(&flags));
    }

    #[test]
    fn test_tag_serializes_flat() {
        let tag = LayoutTag::current(LayoutFlags::new(true, true, false));
        let json = serde_json::to_value(tag).unwrap();
        assert_eq!(json["version"], LAYOUT_VERSION);
        assert_eq!(json["datetime_one_hot"], true);
        assert_eq!(json["location_ids"], false);
    }
}
