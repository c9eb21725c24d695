use serde::{Deserialize, Serialize};

/// A department with the counters the backend computes for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub teacher_count: u32,
    #[serde(default)]
    pub total_declared_lessons: u32,
    #[serde(default)]
    pub total_required_lessons: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDepartment {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}
