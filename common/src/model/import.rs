use crate::model::assignment::TeacherAssignmentBatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validation failure tied to a spreadsheet row (header is row 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    pub row: usize,
    pub message: String,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dòng {}: {}", self.row, self.message)
    }
}

/// Result of validating an assignment spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batches: Vec<TeacherAssignmentBatch>,
    pub errors: Vec<ImportError>,
    pub rows_read: usize,
    #[serde(default)]
    pub already_submitted: bool,
}

impl ImportReport {
    pub fn can_submit(&self) -> bool {
        self.errors.is_empty() && self.batches.iter().any(|b| !b.classes.is_empty())
    }

    pub fn accepted_lessons(&self) -> u32 {
        self.batches
            .iter()
            .flat_map(|b| b.classes.iter())
            .map(|c| c.completed_lessons)
            .sum()
    }
}
