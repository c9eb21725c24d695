pub mod assignments;
pub mod classes;
pub mod departments;
pub mod reports;
pub mod statistics;
pub mod subjects;
pub mod teachers;
pub mod users;

use actix_web::web;

/// Registers every API scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(departments::configure_routes())
        .service(teachers::configure_routes())
        .service(subjects::configure_routes())
        .service(classes::configure_routes())
        .service(assignments::configure_routes())
        .service(statistics::configure_routes())
        .service(reports::configure_routes())
        .service(users::configure_routes());
}
