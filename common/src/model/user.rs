use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    /// Registrar / academic affairs office.
    Ministry,
    DepartmentLeader,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Ministry => "ministry",
            Role::DepartmentLeader => "department_leader",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "ministry" => Some(Role::Ministry),
            "department_leader" => Some(Role::DepartmentLeader),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: Role,
    pub teacher_id: Option<String>,
    pub department_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
}

/// Returned once, when the account is provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub email: String,
    pub role: Role,
    pub token: String,
}
