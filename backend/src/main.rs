mod auth;
mod config;
mod db;
mod error;
mod job_controller;
mod services;
#[cfg(test)]
mod test_support;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use actix_web::{middleware, web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::fs;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env()?;

    db::init(&config).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("cannot open {}: {}", config.database_path.display(), e),
        )
    })?;
    fs::create_dir_all(&config.reports_dir)?;

    let jobs_state = JobsState::start();
    let bind = (config.host.clone(), config.port);
    info!("Server running at {}", config.bind_url());

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(jobs_state.clone()))
            .configure(services::configure)
    })
    .bind(bind)?
    .run()
    .await
}
