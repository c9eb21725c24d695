//! # Report Service Module
//!
//! Reports are produced by background jobs so a large PDF does not hold a
//! request open.
//!
//! Routes under `/api/reports`:
//! - `POST /start`: body `{kind, format, department_id?}`; returns `{job_id}`.
//!   Kinds are `teacher_load`, `department_summary` and `class_summary`;
//!   formats `pdf` and `csv`.
//! - `GET /status/{job_id}`: the job's `JobStatus`.
//! - `POST /cancel/{job_id}`: stops a pending or running job.
//! - `GET /download/{job_id}`: the finished file as an attachment.

pub mod builder;
mod jobs;
mod start;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/reports";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(jobs::status))
        .route("/cancel/{job_id}", post().to(jobs::cancel))
        .route("/download/{job_id}", get().to(jobs::download))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, TestEnv};
    use actix_web::test;
    use common::jobs::JobStatus;
    use common::requests::JobStarted;
    use std::time::Duration;

    #[actix_web::test]
    async fn csv_report_runs_to_completion_and_downloads() {
        let env = TestEnv::new();
        env.add_department("D1", "Toán");
        env.add_teacher("T1", "Nguyen Van A", Some("D1"), 17);
        env.add_class("C1", "10A1", &[("S1", "Toán", 10)]);
        env.add_assignment("A1", "T1", "C1", "S1", 8);
        let token = env.admin();
        let app = test::init_service(env.app()).await;

        let req = test::TestRequest::post()
            .uri("/api/reports/start")
            .insert_header(bearer(&token))
            .set_json(serde_json::json!({ "kind": "teacher_load", "format": "csv" }))
            .to_request();
        let started: JobStarted = test::call_and_read_body_json(&app, req).await;

        let mut status = JobStatus::Pending;
        for _ in 0..200 {
            let req = test::TestRequest::get()
                .uri(&format!("/api/reports/status/{}", started.job_id))
                .insert_header(bearer(&token))
                .to_request();
            status = test::call_and_read_body_json(&app, req).await;
            if status.is_finished() {
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(status, JobStatus::Completed(format!("{}.csv", started.job_id)));

        let req = test::TestRequest::get()
            .uri(&format!("/api/reports/download/{}", started.job_id))
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("Mã GV,Họ tên,"));
        assert!(text.contains("T1,Nguyen Van A,D1,17,0,17,8,9,0,47.06"));

        let req = test::TestRequest::post()
            .uri(&format!("/api/reports/cancel/{}", started.job_id))
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);
    }

    #[actix_web::test]
    async fn unknown_jobs_are_not_found() {
        let env = TestEnv::new();
        let token = env.admin();
        let app = test::init_service(env.app()).await;
        for uri in ["/api/reports/status/nope", "/api/reports/download/nope"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header(bearer(&token))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 404);
        }
        let req = test::TestRequest::post()
            .uri("/api/reports/cancel/nope")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
