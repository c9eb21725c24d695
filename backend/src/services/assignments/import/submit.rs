use super::{check_upload, read_upload, record_submission};
use crate::auth::{self, ASSIGNERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::services::assignments::bulk::insert_batches;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::assignment::Assignment;
use log::{info, warn};
use rusqlite::TransactionBehavior;

async fn submit_import(
    req: &HttpRequest,
    config: &AppConfig,
    payload: Multipart,
) -> Result<Vec<Assignment>, ApiError> {
    let user = auth::authorize(req, config, ASSIGNERS)?;
    let upload = read_upload(payload).await?;
    let mut conn = db::open(&config.database_path)?;

    let report = check_upload(&conn, config, &user, &upload)?;
    if !report.errors.is_empty() {
        warn!(
            "{} submitted {} with {} error(s)",
            user.email,
            upload.file_name,
            report.errors.len()
        );
        return Err(ApiError::Rejected(
            report.errors.iter().map(|e| e.to_string()).collect(),
        ));
    }
    if !report.can_submit() {
        return Err(ApiError::BadRequest(
            "Tệp không có phân công nào để lưu".to_string(),
        ));
    }
    if report.already_submitted {
        warn!("{} re-submitted upload {}", user.email, upload.md5);
    }

    // the fingerprint commits with the assignments or not at all
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let created = insert_batches(&tx, &report.batches)?;
    record_submission(&tx, &upload.md5, &report)?;
    tx.commit()?;
    info!(
        "{} imported {} assignment(s) from {}",
        user.email,
        created.len(),
        upload.file_name
    );
    Ok(created)
}

pub async fn process(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> impl Responder {
    match submit_import(&req, &config, payload).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => e.error_response(),
    }
}
