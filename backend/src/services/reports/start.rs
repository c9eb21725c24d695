//! `POST /api/reports/start`: schedules a report job and returns its id.
//!
//! The work runs under `spawn_blocking`: the table is loaded from the store,
//! then written row by row, with the job's cancellation flag checked between
//! rows. Progress and the final status go through the job controller's
//! channel; the finished status carries the file name inside `REPORTS_DIR`.

use super::builder::{self, RenderError};
use crate::auth::{self, ANYONE};
use crate::config::AppConfig;
use crate::db;
use crate::error::ApiError;
use crate::job_controller::state::{JobUpdate, JobsState};
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::jobs::JobStatus;
use common::requests::{JobStarted, StartReportRequest};
use log::{info, warn};
use std::sync::atomic::AtomicBool;
use tokio::sync::mpsc;
use uuid::Uuid;

pub async fn process(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    state: web::Data<JobsState>,
    payload: web::Json<StartReportRequest>,
) -> impl Responder {
    match schedule_report_job(&req, &config, &state, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Accepted().json(JobStarted { job_id }),
        Err(e) => e.error_response(),
    }
}

async fn schedule_report_job(
    req: &HttpRequest,
    config: &AppConfig,
    state: &JobsState,
    mut request: StartReportRequest,
) -> Result<String, ApiError> {
    let user = auth::authorize(req, config, ANYONE)?;
    if let Some(dep) = auth::department_scope(&user)? {
        request.department_id = Some(dep.to_string());
    }

    let job_id = Uuid::new_v4().to_string();
    let cancel = state.register(&job_id).await;
    info!(
        "{} started {:?} report job {} ({:?})",
        user.email, request.kind, job_id, request.format
    );

    let tx = state.tx.clone();
    let config = config.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        let job_id = job_id_for_task;
        let worker_tx = tx.clone();
        let worker_job_id = job_id.clone();
        let handle = tokio::task::spawn_blocking(move || {
            report_blocking(&worker_tx, &worker_job_id, &config, &request, &cancel)
        });

        let status = match handle.await {
            Ok(Ok(file_name)) => JobStatus::Completed(file_name),
            Ok(Err(RenderError::Cancelled)) => {
                info!("report job {} cancelled", job_id);
                JobStatus::Cancelled
            }
            Ok(Err(RenderError::Failed(e))) => {
                warn!("report job {} failed: {}", job_id, e);
                JobStatus::Failed(e)
            }
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx.send(JobUpdate { job_id, status }).await;
    });

    Ok(job_id)
}

/// Builds and writes one report; returns the produced file name.
fn report_blocking(
    tx: &mpsc::Sender<JobUpdate>,
    job_id: &str,
    config: &AppConfig,
    request: &StartReportRequest,
    cancel: &AtomicBool,
) -> Result<String, RenderError> {
    let send = |status: JobStatus| {
        let _ = tx.blocking_send(JobUpdate {
            job_id: job_id.to_string(),
            status,
        });
    };
    send(JobStatus::InProgress(0));

    let conn = db::open(&config.database_path)?;
    let table = builder::build_table(&conn, config, request.kind, request.department_id.as_deref())?;
    drop(conn);

    let file_name = format!("{}.{}", job_id, request.format.extension());
    let path = config.reports_dir.join(&file_name);
    let mut last = 0;
    builder::render(&table, request.format, &path, config, cancel, &mut |pct: u32| {
        // rows are many; only report whole steps of 10%
        if pct >= last + 10 || pct == 100 {
            last = pct;
            send(JobStatus::InProgress(pct));
        }
    })?;
    Ok(file_name)
}
