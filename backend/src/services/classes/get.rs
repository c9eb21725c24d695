use super::store;
use crate::auth::{self, ANYONE};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::class::{Class, ClassSubjectInfo};
use serde::Deserialize;

pub async fn list(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        Ok(store::load_classes(&conn)?)
    });
    match result {
        Ok(classes) => HttpResponse::Ok().json(classes),
        Err(e) => e.error_response(),
    }
}

fn get_class(config: &AppConfig, class_id: &str) -> Result<Class, ApiError> {
    let conn = db::open(&config.database_path)?;
    store::find_class(&conn, class_id)?.ok_or_else(|| ApiError::NotFound(format!("lớp {}", class_id)))
}

pub async fn one(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    class_id: web::Path<String>,
) -> impl Responder {
    match auth::authorize(&req, &config, ANYONE).and_then(|_| get_class(&config, &class_id)) {
        Ok(class) => HttpResponse::Ok().json(class),
        Err(e) => e.error_response(),
    }
}

#[derive(Deserialize)]
pub struct InfoQuery {
    pub teacher_id: Option<String>,
}

pub fn class_subject_info(
    class: &Class,
    subject_id: &str,
    teacher_id: Option<&str>,
) -> Result<ClassSubjectInfo, ApiError> {
    let entry = class.subject(subject_id).ok_or_else(|| {
        ApiError::NotFound(format!("môn {} trong lớp {}", subject_id, class.name))
    })?;
    let remaining_lessons = match teacher_id {
        Some(teacher) => entry.remaining_lessons_excluding(teacher),
        None => entry.remaining_lessons(),
    };
    Ok(ClassSubjectInfo {
        remaining_lessons,
        total_lessons: entry.lesson_count,
    })
}

pub async fn subject_info(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    path: web::Path<(String, String)>,
    query: web::Query<InfoQuery>,
) -> impl Responder {
    let (class_id, subject_id) = path.into_inner();
    let result = auth::authorize(&req, &config, ANYONE)
        .and_then(|_| get_class(&config, &class_id))
        .and_then(|class| class_subject_info(&class, &subject_id, query.teacher_id.as_deref()));
    match result {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => e.error_response(),
    }
}
