use crate::model::subject::Subject;
use serde::{Deserialize, Serialize};

/// One teacher's share of a class-subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentEntry {
    pub assignment_id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub completed_lessons: u32,
}

/// A subject taught in a class, with the lessons declared for it and the
/// assignments already drawn against that declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSubject {
    pub subject: Subject,
    pub lesson_count: u32,
    #[serde(default)]
    pub assignments: Vec<AssignmentEntry>,
}

impl ClassSubject {
    pub fn assigned_lessons(&self) -> u32 {
        self.assignments.iter().map(|a| a.completed_lessons).sum()
    }

    /// Declared lessons not yet covered by any assignment.
    pub fn remaining_lessons(&self) -> u32 {
        self.lesson_count.saturating_sub(self.assigned_lessons())
    }

    /// Remaining lessons when the assignments held by `teacher_id` are
    /// treated as free again (used when that teacher's share is edited).
    pub fn remaining_lessons_excluding(&self, teacher_id: &str) -> u32 {
        let others: u32 = self
            .assignments
            .iter()
            .filter(|a| a.teacher_id != teacher_id)
            .map(|a| a.completed_lessons)
            .sum();
        self.lesson_count.saturating_sub(others)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub grade: u8,
    pub campus: Option<String>,
    pub size: Option<u32>,
    /// Order is significant: the importer walks it front to back.
    #[serde(default)]
    pub subjects: Vec<ClassSubject>,
}

impl Class {
    pub fn subject(&self, subject_id: &str) -> Option<&ClassSubject> {
        self.subjects.iter().find(|s| s.subject.id == subject_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSubjectInput {
    pub subject_id: String,
    pub lesson_count: u32,
}

/// Body accepted by the class create/update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveClass {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub grade: u8,
    pub campus: Option<String>,
    pub size: Option<u32>,
    #[serde(default)]
    pub subjects: Vec<ClassSubjectInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSubjectInfo {
    pub remaining_lessons: u32,
    pub total_lessons: u32,
}

/// Response of the classes-by-subject lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesBySubject {
    pub classes: Vec<Class>,
}
