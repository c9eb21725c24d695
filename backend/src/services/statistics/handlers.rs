use super::aggregate;
use crate::auth::{self, ANYONE};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::classes::store as class_store;
use crate::services::departments::store as department_store;
use crate::services::subjects::store as subject_store;
use crate::services::teachers::store as teacher_store;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::load;
use common::model::teacher::Teacher;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StatisticsFilter {
    pub department_id: Option<String>,
}

/// Teaching staff, with the exclusion list applied.
pub fn teaching_staff(conn: &Connection, config: &AppConfig) -> rusqlite::Result<Vec<Teacher>> {
    let mut teachers = teacher_store::load_teachers(conn)?;
    load::retain_teaching_staff(&mut teachers, &config.excluded_teacher_ids);
    Ok(teachers)
}

pub async fn teachers(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    filter: web::Query<StatisticsFilter>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|user| {
        let department = auth::department_scope(&user)?
            .map(String::from)
            .or_else(|| filter.department_id.clone());
        let conn = db::open(&config.database_path)?;
        let mut teachers = teaching_staff(&conn, &config)?;
        if let Some(dep) = department {
            teachers.retain(|t| t.department_id.as_deref() == Some(dep.as_str()));
        }
        Ok::<_, ApiError>(aggregate::teacher_summaries(&teachers))
    });
    match result {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(e) => e.error_response(),
    }
}

pub async fn classes(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        Ok(aggregate::class_statistics(&class_store::load_classes(&conn)?))
    });
    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}

pub async fn subjects(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        let subjects = subject_store::load_subjects(&conn)?;
        let classes = class_store::load_classes(&conn)?;
        Ok(aggregate::subject_statistics(&subjects, &classes))
    });
    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}

pub async fn departments(req: HttpRequest, config: web::Data<AppConfig>) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        let departments = department_store::load_departments(&conn)?;
        let teachers = teaching_staff(&conn, &config)?;
        Ok(aggregate::department_statistics(&departments, &teachers))
    });
    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}
