//! Routes under `/api/departments`: list with counters, create, update, delete.

mod handlers;
pub mod store;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/departments";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(handlers::list))
        .route("", post().to(handlers::create))
        .route("/{department_id}", put().to(handlers::update))
        .route("/{department_id}", delete().to(handlers::remove))
}
