use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub run_number: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowRunPage {
    pub workflow_runs: Vec<WorkflowRun>,
}

impl WorkflowRun {
    /// Short form used in error messages, e.g. `CI #42`.
    pub fn label(&self) -> String {
        format!("{} #{}", self.name.as_deref().unwrap_or(""), self.run_number)
    }
}

impl fmt::Display for WorkflowRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}    {}",
            self.label(),
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let run: WorkflowRun = serde_json::from_str(
            r#"{"id": 7, "name": "CI", "run_number": 42, "created_at": "2022-06-01T10:00:00Z", "status": "completed"}"#,
        )
        .unwrap();

        assert_eq!(run.label(), "CI #42");
        assert_eq!(run.to_string(), "CI #42    2022-06-01T10:00:00Z");
    }
}
