use super::store;
use crate::auth::{self, ANYONE, MANAGERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::classes::store as class_store;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::class::ClassesBySubject;
use common::model::subject::SaveSubject;
use log::info;

pub async fn list(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        Ok(store::load_subjects(&conn)?)
    });
    match result {
        Ok(subjects) => HttpResponse::Ok().json(subjects),
        Err(e) => e.error_response(),
    }
}

fn save_subject(
    req: &HttpRequest,
    config: &AppConfig,
    mut payload: SaveSubject,
    existing_id: Option<String>,
) -> Result<String, ApiError> {
    let user = auth::authorize(req, config, MANAGERS)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Tên môn học không được để trống".to_string()));
    }
    let conn = db::open(&config.database_path)?;
    if let Some(id) = existing_id {
        if !store::subject_exists(&conn, &id)? {
            return Err(ApiError::NotFound(format!("môn học {}", id)));
        }
        payload.id = Some(id);
    }
    let id = store::save_subject(&conn, &payload)?;
    info!("{} saved subject {}", user.email, id);
    Ok(id)
}

pub async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<SaveSubject>,
) -> impl Responder {
    match save_subject(&req, &config, payload.into_inner(), None) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn update(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    subject_id: web::Path<String>,
    payload: web::Json<SaveSubject>,
) -> impl Responder {
    match save_subject(&req, &config, payload.into_inner(), Some(subject_id.into_inner())) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn remove(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    subject_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, MANAGERS).and_then(|user| {
        let conn = db::open(&config.database_path)?;
        if !store::delete_subject(&conn, &subject_id)? {
            return Err(ApiError::NotFound(format!("môn học {}", subject_id)));
        }
        info!("{} deleted subject {}", user.email, subject_id);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

fn classes_by_subject(config: &AppConfig, subject_id: &str) -> Result<ClassesBySubject, ApiError> {
    let conn = db::open(&config.database_path)?;
    if !store::subject_exists(&conn, subject_id)? {
        return Err(ApiError::NotFound(format!("môn học {}", subject_id)));
    }
    let classes = class_store::load_classes(&conn)?
        .into_iter()
        .filter(|c| c.subject(subject_id).is_some())
        .collect();
    Ok(ClassesBySubject { classes })
}

pub async fn classes(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    subject_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE)
        .and_then(|_| classes_by_subject(&config, &subject_id));
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => e.error_response(),
    }
}
