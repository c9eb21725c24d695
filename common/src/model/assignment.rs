use serde::{Deserialize, Serialize};

/// A teacher's share of the lessons declared for one class-subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub lessons_per_week: Option<u32>,
    pub number_of_weeks: Option<u32>,
    pub completed_lessons: u32,
}

/// Body of a single create/update. `completed_lessons` is computed as
/// `lessons_per_week * number_of_weeks`, capped by the remaining capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAssignment {
    pub teacher_id: String,
    pub class_id: String,
    pub subject_id: String,
    pub lessons_per_week: u32,
    pub number_of_weeks: u32,
}

/// One class-subject entry inside a bulk batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLessons {
    pub class_id: String,
    pub subject_id: String,
    pub completed_lessons: u32,
}

/// All new assignments for one teacher, as produced by the importer and
/// accepted by the bulk create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherAssignmentBatch {
    pub teacher_id: String,
    pub classes: Vec<ClassLessons>,
}
