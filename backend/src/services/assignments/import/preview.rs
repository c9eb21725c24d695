use super::{check_upload, read_upload};
use crate::auth::{self, ASSIGNERS};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::import::ImportReport;
use log::info;

async fn preview_import(
    req: &HttpRequest,
    config: &AppConfig,
    payload: Multipart,
) -> Result<ImportReport, ApiError> {
    let user = auth::authorize(req, config, ASSIGNERS)?;
    let upload = read_upload(payload).await?;
    let conn = db::open(&config.database_path)?;
    let report = check_upload(&conn, config, &user, &upload)?;
    info!(
        "{} previewed {}: {} row(s), {} error(s)",
        user.email,
        upload.file_name,
        report.rows_read,
        report.errors.len()
    );
    Ok(report)
}

pub async fn process(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    payload: Multipart,
) -> impl Responder {
    match preview_import(&req, &config, payload).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.error_response(),
    }
}
