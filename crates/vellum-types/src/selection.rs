use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;
use crate::ids::VersionId;

/// What the version under inspection is compared against.
///
/// On the wire a selection is a single string: `mostRecent`, `published`,
/// or the id of a historical version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompareSelection {
    /// The entity's newest state, including unpublished drafts.
    #[default]
    MostRecent,
    /// The entity's currently published state.
    Published,
    /// A specific historical version.
    SpecificVersion(VersionId),
}

impl CompareSelection {
    pub const MOST_RECENT: &'static str = "mostRecent";
    pub const PUBLISHED: &'static str = "published";

    /// The version id for `SpecificVersion`, `None` otherwise.
    pub fn version_id(&self) -> Option<&VersionId> {
        match self {
            Self::SpecificVersion(id) => Some(id),
            _ => None,
        }
    }
}

impl FromStr for CompareSelection {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::MOST_RECENT => Ok(Self::MostRecent),
            Self::PUBLISHED => Ok(Self::Published),
            other => Ok(Self::SpecificVersion(VersionId::new(other)?)),
        }
    }
}

impl fmt::Display for CompareSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MostRecent => f.write_str(Self::MOST_RECENT),
            Self::Published => f.write_str(Self::PUBLISHED),
            Self::SpecificVersion(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for CompareSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompareSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
