//! Account provisioning under `/api/users` (admin only). Creating an account
//! issues the bearer token the account authenticates with.

use crate::auth::{self, is_school_email, ADMINS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError, Scope};
use common::model::user::{CreateUser, IssuedToken, Role, User};
use log::info;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/users";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(create))
        .route("/{email}", delete().to(revoke))
}

fn load_users(conn: &Connection) -> rusqlite::Result<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT email, role, teacher_id, department_id FROM users ORDER BY email")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut users = Vec::new();
    for row in rows {
        let (email, role, teacher_id, department_id) = row?;
        if let Some(role) = Role::parse(&role) {
            users.push(User {
                email,
                role,
                teacher_id,
                department_id,
            });
        }
    }
    Ok(users)
}

async fn list(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ADMINS).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        Ok(load_users(&conn)?)
    });
    match result {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => e.error_response(),
    }
}

fn create_user(
    req: &HttpRequest,
    config: &AppConfig,
    payload: CreateUser,
) -> Result<IssuedToken, ApiError> {
    let admin = auth::authorize(req, config, ADMINS)?;
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || !is_school_email(&email, config.school_email_domain.as_deref()) {
        return Err(ApiError::BadRequest(crate::error::UNAUTHORIZED_MESSAGE.to_string()));
    }
    if payload.role == Role::DepartmentLeader && payload.department_id.is_none() {
        return Err(ApiError::BadRequest(
            "Tổ trưởng phải thuộc một tổ bộ môn".to_string(),
        ));
    }

    let token = db::new_id();
    let conn = db::open(&config.database_path)?;
    conn.execute(
        "INSERT INTO users (token, email, role, teacher_id, department_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            token,
            email,
            payload.role.as_str(),
            payload.teacher_id,
            payload.department_id
        ],
    )?;
    info!("{} provisioned {} as {}", admin.email, email, payload.role.as_str());
    Ok(IssuedToken {
        email,
        role: payload.role,
        token,
    })
}

async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<CreateUser>,
) -> impl Responder {
    match create_user(&req, &config, payload.into_inner()) {
        Ok(issued) => HttpResponse::Created().json(issued),
        Err(e) => e.error_response(),
    }
}

async fn revoke(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    email: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ADMINS).and_then(|admin| {
        let conn = db::open(&config.database_path)?;
        let removed = conn.execute(
            "DELETE FROM users WHERE email = ?1",
            params![email.trim().to_lowercase()],
        )?;
        if removed == 0 {
            return Err(ApiError::NotFound(format!("tài khoản {}", email)));
        }
        info!("{} revoked {}", admin.email, email);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
