use crate::auth::{self, ANYONE};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::job_controller::state::{CancelOutcome, JobsState};
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;

/// `GET /status/{job_id}`
pub async fn status(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    state: web::Data<JobsState>,
    job_id: web::Path<String>,
) -> impl Responder {
    if let Err(e) = auth::authorize(&req, &config, ANYONE) {
        return e.error_response();
    }
    match state.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => ApiError::NotFound(format!("công việc {}", job_id)).error_response(),
    }
}

/// `POST /cancel/{job_id}`
pub async fn cancel(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    state: web::Data<JobsState>,
    job_id: web::Path<String>,
) -> impl Responder {
    if let Err(e) = auth::authorize(&req, &config, ANYONE) {
        return e.error_response();
    }
    match state.cancel(&job_id).await {
        CancelOutcome::Requested => HttpResponse::Accepted().finish(),
        CancelOutcome::AlreadyFinished => {
            ApiError::Conflict(format!("Công việc {} đã kết thúc", job_id)).error_response()
        }
        CancelOutcome::Unknown => {
            ApiError::NotFound(format!("công việc {}", job_id)).error_response()
        }
    }
}

async fn finished_file(
    req: &HttpRequest,
    config: &AppConfig,
    state: &JobsState,
    job_id: &str,
) -> Result<NamedFile, ApiError> {
    auth::authorize(req, config, ANYONE)?;
    let file_name = match state.status(job_id).await {
        Some(JobStatus::Completed(file_name)) => file_name,
        Some(_) => {
            return Err(ApiError::Conflict(format!(
                "Báo cáo {} chưa sẵn sàng",
                job_id
            )))
        }
        None => return Err(ApiError::NotFound(format!("công việc {}", job_id))),
    };

    let file = NamedFile::open(config.reports_dir.join(&file_name))?;
    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file_name)],
    }))
}

/// `GET /download/{job_id}`
pub async fn download(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    state: web::Data<JobsState>,
    job_id: web::Path<String>,
) -> HttpResponse {
    match finished_file(&req, &config, &state, &job_id).await {
        Ok(file) => file.into_response(&req),
        Err(e) => e.error_response(),
    }
}
