use super::store;
use crate::auth::{self, ANYONE, MANAGERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::statistics::aggregate;
use crate::services::teachers::store as teacher_store;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::load;
use common::model::department::{Department, SaveDepartment};
use log::info;

fn list_departments(req: &HttpRequest, config: &AppConfig) -> Result<Vec<Department>, ApiError> {
    auth::authorize(req, config, ANYONE)?;
    let conn = db::open(&config.database_path)?;
    let departments = store::load_departments(&conn)?;
    let mut teachers = teacher_store::load_teachers(&conn)?;
    load::retain_teaching_staff(&mut teachers, &config.excluded_teacher_ids);

    Ok(aggregate::department_statistics(&departments, &teachers)
        .into_iter()
        .map(|stats| Department {
            id: stats.department_id,
            name: stats.name,
            teacher_count: stats.teacher_count,
            total_declared_lessons: stats.total_declared_lessons,
            total_required_lessons: stats.total_final_basic_lessons,
        })
        .collect())
}

pub async fn list(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    match list_departments(&req, &config) {
        Ok(departments) => HttpResponse::Ok().json(departments),
        Err(e) => e.error_response(),
    }
}

fn save_department(
    req: &HttpRequest,
    config: &AppConfig,
    mut payload: SaveDepartment,
    existing_id: Option<String>,
) -> Result<String, ApiError> {
    let user = auth::authorize(req, config, MANAGERS)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Tên tổ bộ môn không được để trống".to_string()));
    }
    let conn = db::open(&config.database_path)?;
    if let Some(id) = existing_id {
        if !store::department_exists(&conn, &id)? {
            return Err(ApiError::NotFound(format!("tổ bộ môn {}", id)));
        }
        payload.id = Some(id);
    }
    let id = store::save_department(&conn, &payload)?;
    info!("{} saved department {}", user.email, id);
    Ok(id)
}

pub async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<SaveDepartment>,
) -> impl Responder {
    match save_department(&req, &config, payload.into_inner(), None) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn update(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    department_id: web::Path<String>,
    payload: web::Json<SaveDepartment>,
) -> impl Responder {
    match save_department(&req, &config, payload.into_inner(), Some(department_id.into_inner())) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn remove(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    department_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, MANAGERS).and_then(|user| {
        let conn = db::open(&config.database_path)?;
        if !store::delete_department(&conn, &department_id)? {
            return Err(ApiError::NotFound(format!("tổ bộ môn {}", department_id)));
        }
        info!("{} deleted department {}", user.email, department_id);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
