//! Read-only dashboard figures under `/api/statistics`:
//! `teachers` (load summaries, `?department_id=`), `classes`, `subjects`,
//! `departments`.

pub mod aggregate;
pub mod handlers;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/statistics";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/teachers", get().to(handlers::teachers))
        .route("/classes", get().to(handlers::classes))
        .route("/subjects", get().to(handlers::subjects))
        .route("/departments", get().to(handlers::departments))
}
