use super::capacity::remaining_without;
use super::store;
use crate::auth::{self, ANYONE, ASSIGNERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::classes::store as class_store;
use crate::services::teachers::store as teacher_store;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::assignment::{Assignment, SaveAssignment};
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AssignmentFilter {
    pub teacher_id: Option<String>,
}

pub async fn list(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    filter: web::Query<AssignmentFilter>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ANYONE).and_then(|_| {
        let conn = db::open(&config.database_path)?;
        Ok(store::load_assignments(&conn, filter.teacher_id.as_deref())?)
    });
    match result {
        Ok(assignments) => HttpResponse::Ok().json(assignments),
        Err(e) => e.error_response(),
    }
}

/// Builds the stored record for `payload`: completed lessons are
/// `lessons_per_week * number_of_weeks`, capped by what the class-subject
/// has left once `replacing` (the assignment being edited) is set aside.
fn plan_assignment(
    conn: &Connection,
    payload: &SaveAssignment,
    id: String,
    replacing: Option<&str>,
) -> Result<Assignment, ApiError> {
    if payload.lessons_per_week == 0 || payload.number_of_weeks == 0 {
        return Err(ApiError::BadRequest(
            "Số tiết mỗi tuần và số tuần phải lớn hơn 0".to_string(),
        ));
    }
    if !teacher_store::teacher_exists(conn, &payload.teacher_id)? {
        return Err(ApiError::NotFound(format!("giáo viên {}", payload.teacher_id)));
    }
    let class = class_store::find_class(conn, &payload.class_id)?
        .ok_or_else(|| ApiError::NotFound(format!("lớp {}", payload.class_id)))?;
    let entry = class.subject(&payload.subject_id).ok_or_else(|| {
        ApiError::NotFound(format!("môn {} trong lớp {}", payload.subject_id, class.name))
    })?;

    let remaining = match replacing {
        Some(assignment_id) => remaining_without(entry, assignment_id),
        None => entry.remaining_lessons(),
    };
    if remaining == 0 {
        return Err(ApiError::Conflict(format!(
            "Lớp {} môn {} đã được phân công đủ {} tiết",
            class.name, entry.subject.name, entry.lesson_count
        )));
    }

    let requested = payload.lessons_per_week.saturating_mul(payload.number_of_weeks);
    Ok(Assignment {
        id,
        teacher_id: payload.teacher_id.clone(),
        class_id: payload.class_id.clone(),
        subject_id: payload.subject_id.clone(),
        lessons_per_week: Some(payload.lessons_per_week),
        number_of_weeks: Some(payload.number_of_weeks),
        completed_lessons: requested.min(remaining),
    })
}

fn save_assignment(
    req: &HttpRequest,
    config: &AppConfig,
    payload: &SaveAssignment,
    existing_id: Option<String>,
) -> Result<Assignment, ApiError> {
    let user = auth::authorize(req, config, ASSIGNERS)?;
    let mut conn = db::open(&config.database_path)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let assignment = match existing_id {
        Some(id) => {
            if store::find_assignment(&tx, &id)?.is_none() {
                return Err(ApiError::NotFound(format!("phân công {}", id)));
            }
            let planned = plan_assignment(&tx, payload, id.clone(), Some(&id))?;
            store::update_assignment(&tx, &planned)?;
            planned
        }
        None => {
            let planned = plan_assignment(&tx, payload, db::new_id(), None)?;
            store::insert_assignment(&tx, &planned)?;
            planned
        }
    };
    tx.commit()?;

    info!(
        "{} assigned {} lessons of {}/{} to {}",
        user.email,
        assignment.completed_lessons,
        assignment.class_id,
        assignment.subject_id,
        assignment.teacher_id
    );
    Ok(assignment)
}

pub async fn create(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<SaveAssignment>,
) -> impl Responder {
    match save_assignment(&req, &config, &payload, None) {
        Ok(assignment) => HttpResponse::Created().json(assignment),
        Err(e) => e.error_response(),
    }
}

pub async fn update(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    assignment_id: web::Path<String>,
    payload: web::Json<SaveAssignment>,
) -> impl Responder {
    match save_assignment(&req, &config, &payload, Some(assignment_id.into_inner())) {
        Ok(assignment) => HttpResponse::Ok().json(assignment),
        Err(e) => e.error_response(),
    }
}

pub async fn remove(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    assignment_id: web::Path<String>,
) -> impl Responder {
    let result = auth::authorize(&req, &config, ASSIGNERS).and_then(|user| {
        let conn = db::open(&config.database_path)?;
        if !store::delete_assignment(&conn, &assignment_id)? {
            return Err(ApiError::NotFound(format!("phân công {}", assignment_id)));
        }
        info!("{} deleted assignment {}", user.email, assignment_id);
        Ok(())
    });
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
