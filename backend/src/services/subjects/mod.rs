//! Routes under `/api/subjects`: list, create, update, delete, and
//! `GET /{subject_id}/classes` for the classes that teach a subject.

mod handlers;
pub mod store;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/subjects";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(handlers::list))
        .route("", post().to(handlers::create))
        .route("/{subject_id}", put().to(handlers::update))
        .route("/{subject_id}", delete().to(handlers::remove))
        .route("/{subject_id}/classes", get().to(handlers::classes))
}
