//! Pruning of untagged container images.
//!
//! Packages are processed one after another. A failure inside a package stops
//! that package only; the remaining packages are still pruned and every
//! failure is handed back in the [`PruneSummary`].

use std::io::Write;

use tracing::{info, warn};

use crate::{
    error::{PruneError, Result},
    github::{DeleteOutcome, Owner, PackageClient},
    registry::{RegistryClient, RepositoryResolver},
    retention::{Cutoff, RetentionPolicy},
};

/// Pseudo package name selecting every container package of the owner.
pub const ALL_PACKAGES: &str = "all";

#[derive(Debug)]
pub struct PackageReport {
    pub package: String,
    /// Number of versions deleted, or that would have been in a dry run.
    pub result: Result<usize>,
}

#[derive(Debug, Default)]
pub struct PruneSummary {
    pub packages: Vec<PackageReport>,
}

impl PruneSummary {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PruneError)> {
        self.packages.iter().filter_map(|report| match &report.result {
            Ok(_) => None,
            Err(err) => Some((report.package.as_str(), err)),
        })
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

pub struct PruneOrchestrator<'a> {
    packages: &'a PackageClient,
    registry: &'a RegistryClient,
    dry_run: bool,
}

impl<'a> PruneOrchestrator<'a> {
    pub fn new(packages: &'a PackageClient, registry: &'a RegistryClient, dry_run: bool) -> Self {
        Self {
            packages,
            registry,
            dry_run,
        }
    }

    /// Prunes `targets`, or every container package when the only target is
    /// `all`. Errors are returned directly only when the owner or the package
    /// list cannot be resolved; a failed package is passed to `on_failure`
    /// before the next one starts.
    pub async fn run<W, F>(
        &self,
        out: &mut W,
        user: Option<&str>,
        targets: &[String],
        cutoff: Cutoff,
        mut on_failure: F,
    ) -> Result<PruneSummary>
    where
        W: Write,
        F: FnMut(&str, &PruneError),
    {
        let owner = self.packages.resolve_owner(user).await?;

        let targets = match targets {
            [only] if only == ALL_PACKAGES => self.packages.list_container_packages(&owner).await?,
            _ => targets.to_vec(),
        };

        let policy = RetentionPolicy::new(cutoff);
        let mut summary = PruneSummary::default();

        for package in targets {
            writeln!(out, "Pruning images of {package}...")?;

            let result = self.prune_package(out, &owner, &package, &policy).await;
            if let Err(err) = &result {
                warn!("Pruning {package} failed: {err}");
                out.flush()?;
                on_failure(&package, err);
            }

            summary.packages.push(PackageReport { package, result });
        }

        Ok(summary)
    }

    async fn prune_package<W: Write>(
        &self,
        out: &mut W,
        owner: &Owner,
        package: &str,
        policy: &RetentionPolicy,
    ) -> Result<usize> {
        let versions = self.packages.list_versions(owner, package).await?;

        let keep = {
            let resolver = RepositoryResolver::new(self.registry, owner.repository(package));
            policy.keep_set(&resolver, &versions).await?
        };

        info!(
            "{package}: {} versions, keeping {} digests",
            versions.len(),
            keep.len()
        );

        let deletable = policy.deletable(&versions, &keep);
        if deletable.is_empty() {
            return Ok(0);
        }

        let header = if self.dry_run { "Would delete" } else { "Deleted" };
        writeln!(out, "  {header}:")?;

        for version in &deletable {
            writeln!(out, "  {}", version.digest)?;

            if self.dry_run {
                continue;
            }

            match self.packages.delete_version(owner, package, version).await? {
                DeleteOutcome::Deleted => {}
                DeleteOutcome::Forbidden | DeleteOutcome::MaskedNotFound => {
                    return Err(PruneError::InsufficientPrivilege(version.digest.to_string()));
                }
            }
        }

        Ok(deletable.len())
    }
}
