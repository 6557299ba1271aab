//! Retention decisions for container package versions.
//!
//! A version survives a prune when it is tagged, when it is a platform image
//! of a tagged manifest list, or when it belongs to a multi-architecture push
//! that straddles the cutoff. Everything else older than the cutoff goes.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    error::{PruneError, Result},
    registry::ManifestDigestResolver,
    types::{Digest, Version},
};

/// Width of the window after the cutoff in which an untagged manifest list
/// is assumed to be an in-progress multi-architecture push.
const GRACE_WINDOW: i64 = 60 * 60;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub type KeepSet = HashSet<Digest>;

/// The instant before which versions become candidates for deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// `now` minus `prune_age` days; fractional days are allowed.
    pub fn from_age(now: DateTime<Utc>, prune_age: f64) -> Result<Self> {
        if !prune_age.is_finite() || prune_age < 0.0 {
            return Err(PruneError::Config(format!("invalid prune age {prune_age}")));
        }

        let millis = (prune_age * MILLIS_PER_DAY).round();
        Duration::try_milliseconds(millis as i64)
            .filter(|_| millis < i64::MAX as f64)
            .and_then(|age| now.checked_sub_signed(age))
            .map(Self)
            .ok_or_else(|| PruneError::Config(format!("prune age {prune_age} is out of range")))
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    fn grace_end(&self) -> DateTime<Utc> {
        self.0 + Duration::seconds(GRACE_WINDOW)
    }
}

pub struct RetentionPolicy {
    cutoff: Cutoff,
}

impl RetentionPolicy {
    pub fn new(cutoff: Cutoff) -> Self {
        Self { cutoff }
    }

    /// Computes the digests that must survive this run.
    ///
    /// Tagged versions older than the cutoff are resolved first so that the
    /// result does not depend on the order of `versions`.
    pub async fn keep_set<R: ManifestDigestResolver>(
        &self,
        resolver: &R,
        versions: &[Version],
    ) -> Result<KeepSet> {
        let cutoff = self.cutoff.instant();
        let grace_end = self.cutoff.grace_end();
        let mut keep = KeepSet::new();

        for version in versions {
            if version.created_at < cutoff && version.is_tagged() {
                keep.insert(version.digest.clone());
                keep.extend(resolver.platform_digests(&version.digest).await?);
            }
        }

        for version in versions {
            if version.created_at < cutoff || version.created_at >= grace_end {
                continue;
            }
            if keep.contains(&version.digest) {
                continue;
            }

            let platforms = resolver.platform_digests(&version.digest).await?;
            if !platforms.is_empty() {
                debug!(
                    "{}: created within grace window, protecting {} platform manifests",
                    version.digest,
                    platforms.len()
                );
            }
            keep.extend(platforms);
        }

        Ok(keep)
    }

    /// Tagged versions are never deletable, whatever `keep` holds.
    pub fn is_deletable(&self, version: &Version, keep: &KeepSet) -> bool {
        version.created_at < self.cutoff.instant()
            && !version.is_tagged()
            && !keep.contains(&version.digest)
    }

    /// Deletable versions in ascending id order.
    pub fn deletable<'v>(&self, versions: &'v [Version], keep: &KeepSet) -> Vec<&'v Version> {
        let mut deletable: Vec<&Version> = versions
            .iter()
            .filter(|v| self.is_deletable(v, keep))
            .collect();
        deletable.sort_by_key(|v| v.id);
        deletable
    }
}
