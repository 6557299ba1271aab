//! Pruning of GitHub Actions workflow run logs.

use std::io::Write;

use crate::{
    error::{PruneError, Result},
    github::{DeleteOutcome, PackageClient},
    retention::Cutoff,
};

pub struct WorkflowRunPruner<'a> {
    client: &'a PackageClient,
    dry_run: bool,
}

impl<'a> WorkflowRunPruner<'a> {
    pub fn new(client: &'a PackageClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Deletes every run of `repository` created before `cutoff` and returns
    /// how many were listed.
    pub async fn run<W: Write>(
        &self,
        out: &mut W,
        user: Option<&str>,
        repository: &str,
        cutoff: Cutoff,
    ) -> Result<usize> {
        let owner = self.client.resolve_owner(user).await?;

        let mut runs = self
            .client
            .list_workflow_runs(owner.login(), repository, cutoff)
            .await?;
        if runs.is_empty() {
            return Ok(0);
        }
        runs.sort_by_key(|run| run.id);

        let header = if self.dry_run { "Would delete" } else { "Deleted" };
        writeln!(out, "{header}:")?;

        for run in &runs {
            writeln!(out, "{run}")?;

            if self.dry_run {
                continue;
            }

            match self
                .client
                .delete_workflow_run(owner.login(), repository, run)
                .await?
            {
                DeleteOutcome::Deleted => {}
                DeleteOutcome::Forbidden | DeleteOutcome::MaskedNotFound => {
                    return Err(PruneError::InsufficientPrivilege(run.label()));
                }
            }
        }

        Ok(runs.len())
    }
}
