//! # Assignment Service Module
//!
//! Every route that creates lessons for a teacher goes through
//! [`capacity`], so a class-subject is never assigned more lessons than it
//! declares.
//!
//! Routes under `/api/assignments`:
//! - `GET /?teacher_id=`: stored assignments, optionally for one teacher.
//! - `POST /`: one assignment from lessons per week and number of weeks.
//! - `PUT /{assignment_id}`, `DELETE /{assignment_id}`.
//! - `POST /bulk`: a list of per-teacher batches, stored all-or-nothing.
//! - `POST /import/preview`: validates an uploaded sheet and returns the report.
//! - `POST /import/submit`: validates again and stores the batches.

mod bulk;
pub mod capacity;
pub mod import;
mod save;
pub mod store;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/assignments";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(save::list))
        .route("", post().to(save::create))
        .route("/bulk", post().to(bulk::process))
        .route("/import/preview", post().to(import::preview::process))
        .route("/import/submit", post().to(import::submit::process))
        .route("/{assignment_id}", put().to(save::update))
        .route("/{assignment_id}", delete().to(save::remove))
}
