use serde::{Deserialize, Serialize};

/// How a teacher is employed by the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    Guest,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::Guest => "guest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "full_time" => Some(EmploymentType::FullTime),
            "guest" => Some(EmploymentType::Guest),
            _ => None,
        }
    }
}

/// An administrative decrease of a teacher's required lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    pub reason: String,
    pub reduced_lessons: u32,
}

/// Lessons taken off a teacher's quota for homeroom duty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeroomReduction {
    pub class_id: Option<String>,
    pub reduced_lessons: u32,
}

/// A teacher as stored by the backend.
///
/// `declared_lessons` is derived: the sum of completed lessons over the
/// teacher's assignments. It is ignored on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub department_id: Option<String>,
    #[serde(default)]
    pub employment_type: EmploymentType,
    pub basic_teaching_lessons: u32,
    #[serde(default)]
    pub reductions: Vec<Reduction>,
    #[serde(default)]
    pub homeroom_reduction: Option<HomeroomReduction>,
    #[serde(default)]
    pub declared_lessons: u32,
}

impl Teacher {
    /// Sum of the non-homeroom reduction entries.
    pub fn teacher_reduction(&self) -> u32 {
        self.reductions.iter().map(|r| r.reduced_lessons).sum()
    }

    pub fn homeroom_reduced_lessons(&self) -> u32 {
        self.homeroom_reduction
            .as_ref()
            .map(|h| h.reduced_lessons)
            .unwrap_or(0)
    }
}

/// `{id, name}` pair used by pickers and the importer's name lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherName {
    pub id: String,
    pub name: String,
}

/// Body accepted by the teacher create/update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTeacher {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub department_id: Option<String>,
    #[serde(default)]
    pub employment_type: EmploymentType,
    pub basic_teaching_lessons: u32,
    #[serde(default)]
    pub reductions: Vec<Reduction>,
    #[serde(default)]
    pub homeroom_reduction: Option<HomeroomReduction>,
}
