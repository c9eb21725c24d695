use super::capacity::CapacityLedger;
use super::store;
use crate::auth::{self, ASSIGNERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::classes::store as class_store;
use crate::services::teachers::store as teacher_store;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::assignment::{Assignment, TeacherAssignmentBatch};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::HashSet;

/// Stores every entry of `batches` or none of them.
///
/// The capacity check is repeated inside an immediate transaction, so entries
/// validated earlier (by the importer, for instance) are rejected if the
/// class-subject filled up in between.
pub fn apply_batches(
    conn: &mut Connection,
    batches: &[TeacherAssignmentBatch],
) -> Result<Vec<Assignment>, ApiError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let created = insert_batches(&tx, batches)?;
    tx.commit()?;
    Ok(created)
}

/// Checks and inserts `batches` inside `tx` without committing, so callers
/// can add their own rows to the same transaction.
pub fn insert_batches(
    tx: &Transaction,
    batches: &[TeacherAssignmentBatch],
) -> Result<Vec<Assignment>, ApiError> {
    let classes = class_store::load_classes(tx)?;
    let teacher_ids: HashSet<String> = teacher_store::teacher_names(tx, None)?
        .into_iter()
        .map(|t| t.id)
        .collect();
    let mut ledger = CapacityLedger::from_classes(&classes);

    let mut errors = Vec::new();
    let mut planned = Vec::new();
    for batch in batches {
        if !teacher_ids.contains(&batch.teacher_id) {
            errors.push(format!("Không tìm thấy giáo viên {}", batch.teacher_id));
            continue;
        }
        for entry in &batch.classes {
            let Some(class) = classes.iter().find(|c| c.id == entry.class_id) else {
                errors.push(format!("Không tìm thấy lớp {}", entry.class_id));
                continue;
            };
            if class.subject(&entry.subject_id).is_none() {
                errors.push(format!(
                    "Không tìm thấy môn {} trong lớp {}",
                    entry.subject_id, class.name
                ));
                continue;
            }
            if entry.completed_lessons == 0 {
                errors.push(format!("Số tiết của lớp {} phải lớn hơn 0", class.name));
                continue;
            }
            if let Err(left) = ledger.take(&entry.class_id, &entry.subject_id, entry.completed_lessons)
            {
                errors.push(format!(
                    "Lớp {} môn {}: số tiết ({}) vượt quá số tiết còn lại ({})",
                    class.name, entry.subject_id, entry.completed_lessons, left
                ));
                continue;
            }
            planned.push(Assignment {
                id: db::new_id(),
                teacher_id: batch.teacher_id.clone(),
                class_id: entry.class_id.clone(),
                subject_id: entry.subject_id.clone(),
                lessons_per_week: None,
                number_of_weeks: None,
                completed_lessons: entry.completed_lessons,
            });
        }
    }

    if !errors.is_empty() {
        warn!("bulk assignment rejected with {} error(s)", errors.len());
        return Err(ApiError::Rejected(errors));
    }
    for assignment in &planned {
        store::insert_assignment(tx, assignment)?;
    }
    Ok(planned)
}

fn create_bulk(
    req: &HttpRequest,
    config: &AppConfig,
    batches: &[TeacherAssignmentBatch],
) -> Result<Vec<Assignment>, ApiError> {
    let user = auth::authorize(req, config, ASSIGNERS)?;
    if batches.iter().all(|b| b.classes.is_empty()) {
        return Err(ApiError::BadRequest("Không có phân công nào để lưu".to_string()));
    }
    let mut conn = db::open(&config.database_path)?;
    let created = apply_batches(&mut conn, batches)?;
    info!("{} bulk-created {} assignment(s)", user.email, created.len());
    Ok(created)
}

pub async fn process(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: web::Json<Vec<TeacherAssignmentBatch>>,
) -> impl Responder {
    match create_bulk(&req, &config, &payload) {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => e.error_response(),
    }
}
