//! Bearer-token checks. Tokens are provisioned through `/api/users`; the
//! login flow that hands them to browsers lives outside this service.

use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::HttpRequest;
use common::model::user::{Role, User};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Roles allowed to change reference data (departments, subjects, classes, teachers).
pub const MANAGERS: &[Role] = &[Role::Admin, Role::Ministry];
/// Roles allowed to create or change assignments.
pub const ASSIGNERS: &[Role] = &[Role::Admin, Role::Ministry, Role::DepartmentLeader];
pub const ADMINS: &[Role] = &[Role::Admin];
/// Any authenticated account.
pub const ANYONE: &[Role] = &[];

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn is_school_email(email: &str, domain: Option<&str>) -> bool {
    match domain {
        None => true,
        Some(domain) => email
            .rsplit_once('@')
            .map(|(_, d)| d.eq_ignore_ascii_case(domain))
            .unwrap_or(false),
    }
}

fn find_user(conn: &Connection, token: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT email, role, teacher_id, department_id FROM users WHERE token = ?1",
        params![token],
        |row| {
            let role: String = row.get(1)?;
            Ok((
                row.get::<_, String>(0)?,
                role,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        },
    )
    .optional()
    .map(|found| {
        found.and_then(|(email, role, teacher_id, department_id)| {
            Role::parse(&role).map(|role| User {
                email,
                role,
                teacher_id,
                department_id,
            })
        })
    })
}

/// Resolves the caller and checks its role against `allowed` (empty means
/// any role).
pub fn authorize(req: &HttpRequest, config: &AppConfig, allowed: &[Role]) -> Result<User, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;
    let conn = db::open(&config.database_path)?;
    let user = find_user(&conn, token)?.ok_or(ApiError::Unauthorized)?;

    if !is_school_email(&user.email, config.school_email_domain.as_deref()) {
        warn!("rejected token of non-school account {}", user.email);
        return Err(ApiError::Unauthorized);
    }
    if !allowed.is_empty() && !allowed.contains(&user.role) {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}

/// The department a caller's listings are limited to. Department leaders are
/// held to their own department; a leader account without one sees nothing.
pub fn department_scope(user: &User) -> Result<Option<&str>, ApiError> {
    match user.role {
        Role::DepartmentLeader => match user.department_id.as_deref() {
            Some(dep) => Ok(Some(dep)),
            None => {
                warn!("department leader {} has no department", user.email);
                Err(ApiError::Forbidden)
            }
        },
        _ => Ok(None),
    }
}
