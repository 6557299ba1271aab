use std::collections::HashSet;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    error::Result,
    registry::client::{Credential, RegistryClient},
    types::Digest,
};

/// Resolves the per-platform manifests that a manifest list is made of.
#[allow(async_fn_in_trait)]
pub trait ManifestDigestResolver {
    /// Returns the sub-manifest digests of `reference`, or an empty set when
    /// it is a single-platform image.
    async fn platform_digests(&self, reference: &Digest) -> Result<HashSet<Digest>>;
}

/// Resolver bound to one repository.
///
/// The pull credential is minted on first use and lives as long as the
/// resolver, which the orchestrator drops once a package has been evaluated.
pub struct RepositoryResolver<'a> {
    client: &'a RegistryClient,
    repository: String,
    credential: OnceCell<Credential>,
}

impl<'a> RepositoryResolver<'a> {
    pub fn new(client: &'a RegistryClient, repository: impl Into<String>) -> Self {
        Self {
            client,
            repository: repository.into(),
            credential: OnceCell::new(),
        }
    }

    async fn credential(&self) -> Result<&Credential> {
        self.credential
            .get_or_try_init(|| self.client.authenticate(&self.repository))
            .await
    }
}

impl ManifestDigestResolver for RepositoryResolver<'_> {
    async fn platform_digests(&self, reference: &Digest) -> Result<HashSet<Digest>> {
        let credential = self.credential().await?;
        let manifest = self
            .client
            .get_manifest(credential, &self.repository, &reference.to_string())
            .await?;

        let digests: HashSet<Digest> = manifest.platform_digests().cloned().collect();
        debug!(
            "{}@{reference}: {} platform manifests",
            self.repository,
            digests.len()
        );

        Ok(digests)
    }
}
