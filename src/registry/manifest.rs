use serde::Deserialize;

use crate::types::Digest;

pub const OCI_IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const OCI_IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

/// Media types offered when fetching a manifest by tag or digest.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = [
    OCI_IMAGE_MANIFEST,
    OCI_IMAGE_INDEX,
    DOCKER_MANIFEST,
    DOCKER_MANIFEST_LIST,
];

/// Entry of a manifest list. Only the digest is read; platform, size and
/// annotations are left to the registry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub digest: Digest,
}

/// A single-platform manifest or a manifest list / image index.
///
/// A document is treated as a list whenever it carries a `manifests` array,
/// whatever its declared media type.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    #[serde(default)]
    pub manifests: Option<Vec<Descriptor>>,
}

impl ManifestDocument {
    /// Digests of the per-platform manifests, empty for a single image.
    pub fn platform_digests(&self) -> impl Iterator<Item = &Digest> {
        self.manifests.iter().flatten().map(|m| &m.digest)
    }
}

pub fn parse_manifest(input: &[u8]) -> Result<ManifestDocument, serde_json::Error> {
    serde_json::from_slice(input)
}
