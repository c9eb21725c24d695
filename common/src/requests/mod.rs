use crate::model::teacher::TeacherName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    TeacherLoad,
    DepartmentSummary,
    ClassSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Request payload for starting a report job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartReportRequest {
    pub kind: ReportKind,
    pub format: ReportFormat,
    /// Restricts teacher-load reports to one department.
    #[serde(default)]
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStarted {
    pub job_id: String,
}

/// Envelope of the teacher-names lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherNamesResponse {
    pub success: bool,
    pub data: Vec<TeacherName>,
}
