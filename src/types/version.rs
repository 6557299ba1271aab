use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Digest;

/// One entry in a container package's version history.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(from = "RawVersion")]
pub struct Version {
    pub id: u64,
    pub digest: Digest,
    pub created_at: DateTime<Utc>,
    pub tags: BTreeSet<String>,
}

impl Version {
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[derive(Debug, Deserialize, Default)]
struct ContainerMetadata {
    #[serde(default)]
    tags: Option<BTreeSet<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct VersionMetadata {
    #[serde(default)]
    container: Option<ContainerMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawVersion {
    id: u64,
    name: Digest,
    created_at: DateTime<Utc>,
    #[serde(default)]
    metadata: Option<VersionMetadata>,
}

impl From<RawVersion> for Version {
    fn from(raw: RawVersion) -> Self {
        let tags = raw
            .metadata
            .and_then(|m| m.container)
            .and_then(|c| c.tags)
            .unwrap_or_default();

        Version {
            id: raw.id,
            digest: raw.name,
            created_at: raw.created_at,
            tags,
        }
    }
}
