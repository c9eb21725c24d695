//! # Class Service Module
//!
//! Routes under `/api/class`:
//! - `GET /`: every class with its ordered subjects and their assignments.
//! - `GET /{class_id}`: one class in the same shape.
//! - `GET /{class_id}/subjects/{subject_id}/info?teacher_id=`: remaining and
//!   total lessons of a class-subject; the given teacher's own share counts
//!   as free.
//! - `POST /`, `PUT /{class_id}`: create or update; the subject list is
//!   replaced and its order kept.
//! - `DELETE /{class_id}`.

mod get;
mod save;
pub mod store;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/class";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("", post().to(save::create))
        .route("/{class_id}", get().to(get::one))
        .route("/{class_id}", put().to(save::update))
        .route("/{class_id}", delete().to(save::remove))
        .route(
            "/{class_id}/subjects/{subject_id}/info",
            get().to(get::subject_info),
        )
}
