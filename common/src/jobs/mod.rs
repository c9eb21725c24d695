use serde::{Deserialize, Serialize};

/// Lifecycle of a background job, as reported by the status endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Progress in percent.
    InProgress(u32),
    /// Carries the file name of the produced artifact.
    Completed(String),
    Failed(String),
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed(_) | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }
}
