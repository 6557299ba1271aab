mod digest;
mod package;
mod version;
mod workflow_run;

pub use digest::{Digest, InvalidDigest};
pub use package::Package;
pub use version::Version;
pub use workflow_run::WorkflowRun;
pub(crate) use workflow_run::WorkflowRunPage;
