use serde::{Deserialize, Serialize};

/// Derived teaching-hour figures for one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub teacher_id: String,
    pub name: String,
    pub department_id: Option<String>,
    pub basic_teaching_lessons: u32,
    pub total_reduced_lessons: u32,
    pub final_basic_lessons: i64,
    pub declared_lessons: u32,
    pub remaining_lessons: u32,
    pub excess_lessons: u32,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherShare {
    pub teacher_id: String,
    pub teacher_name: String,
    pub completed_lessons: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSubjectStatistics {
    pub subject_id: String,
    pub subject_name: String,
    pub declared_lessons: u32,
    pub assigned_lessons: u32,
    pub remaining_lessons: u32,
    pub teachers: Vec<TeacherShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    pub class_id: String,
    pub name: String,
    pub grade: u8,
    pub campus: Option<String>,
    pub declared_lessons: u32,
    pub assigned_lessons: u32,
    pub remaining_lessons: u32,
    pub subjects: Vec<ClassSubjectStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatistics {
    pub subject_id: String,
    pub name: String,
    pub is_specialized: bool,
    pub class_count: u32,
    pub teacher_count: u32,
    pub declared_lessons: u32,
    pub assigned_lessons: u32,
    pub remaining_lessons: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentStatistics {
    pub department_id: String,
    pub name: String,
    pub teacher_count: u32,
    pub total_final_basic_lessons: i64,
    pub total_declared_lessons: u32,
    pub total_excess_lessons: u32,
    pub completion_percentage: f64,
}
