//! # Teacher Service Module
//!
//! Routes under `/api/teachers`:
//! - `GET /`: teachers with their load summary, exclusion list applied,
//!   optionally filtered by `department_id`.
//! - `GET /names`: `{success, data: [{id, name}]}` for pickers and the importer.
//!   Department leaders only see their own department.
//! - `GET /{teacher_id}`: one teacher.
//! - `POST /`, `PUT /{teacher_id}`: create or update, reductions replaced wholesale.
//! - `DELETE /{teacher_id}`: removes the teacher and their assignments.

mod get;
mod save;
pub mod store;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/teachers";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("", post().to(save::create))
        .route("/names", get().to(get::names))
        .route("/{teacher_id}", get().to(get::one))
        .route("/{teacher_id}", put().to(save::update))
        .route("/{teacher_id}", delete().to(save::remove))
}
