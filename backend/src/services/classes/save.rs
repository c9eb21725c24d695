use super::store;
use crate::auth::{self, MANAGERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::class::SaveClass;
use log::info;
use std::collections::HashSet;

fn validate(payload: &SaveClass) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Mã lớp không được để trống".to_string()));
    }
    if !(10..=12).contains(&payload.grade) {
        return Err(ApiError::BadRequest(format!(
            "Khối {} không hợp lệ (chỉ nhận 10, 11, 12)",
            payload.grade
        )));
    }
    let mut seen = HashSet::new();
    for entry in &payload.subjects {
        if !seen.insert(entry.subject_id.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Môn {} bị lặp trong danh sách môn của lớp",
                entry.subject_id
            )));
        }
    }
    Ok(())
}

fn save_class(
    req: &HttpRequest,
    config: &AppConfig,
    mut payload: SaveClass,
    existing_id: Option<String>,
) -> Result<String, ApiError> {
    let user = auth::authorize(req, config, MANAGERS)?;
    validate(&payload)?;
    let mut conn = db::open(&config.database_path)?;
    if let Some(id) = existing_id {
        if !store::class_exists(&conn, &id)? {
            return Err(ApiError::NotFound(format!("lớp {}", id)));
        }
        payload.id = Some(id);
    }
    let id = store::save_class(&mut conn, &payload)?;
    info!("{} saved class {} ({})", user.email, payload.name.trim(), id);
    Ok(id)
}

pub async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<SaveClass>,
) -> impl Responder {
    match save_class(&req, &config, payload.into_inner(), None) {
        Ok(id) => HttpResponse::Created().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn update(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    class_id: web::Path<String>,
    payload: web::Json<SaveClass>,
) -> impl Responder {
    match save_class(&req, &config, payload.into_inner(), Some(class_id.into_inner())) {
        Ok(id) => HttpResponse::Ok().json(serde_json::json!({ "id": id })),
        Err(e) => e.error_response(),
    }
}

pub async fn remove(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    class_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, MANAGERS).and_then(|user| {
        let conn = db::open(&config.database_path)?;
        if !store::delete_class(&conn, &class_id)? {
            return Err(ApiError::NotFound(format!("lớp {}", class_id)));
        }
        info!("{} deleted class {}", user.email, class_id);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
