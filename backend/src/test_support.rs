//! Throwaway database and app wiring for handler tests.

use crate::config::AppConfig;
use crate::db;
use crate::job_controller::state::JobsState;
use crate::services;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use common::model::user::Role;
use rusqlite::{params, Connection};
use tempfile::TempDir;

pub const ADMIN_TOKEN: &str = "admin-token";

pub struct TestEnv {
    // keeps the directory alive for the test's duration
    _dir: TempDir,
    pub config: AppConfig,
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = AppConfig {
            database_path: dir.path().join("test.sqlite"),
            reports_dir: dir.path().join("reports"),
            ..AppConfig::default()
        };
        db::init(&config).expect("schema");
        TestEnv { _dir: dir, config }
    }

    pub fn conn(&self) -> Connection {
        db::open(&self.config.database_path).expect("open test database")
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(JobsState::start()))
            .configure(services::configure)
    }

    pub fn add_user(&self, token: &str, email: &str, role: Role, department_id: Option<&str>) {
        self.conn()
            .execute(
                "INSERT INTO users (token, email, role, department_id) VALUES (?1, ?2, ?3, ?4)",
                params![token, email, role.as_str(), department_id],
            )
            .expect("insert user");
    }

    /// Inserts an admin account and returns its token.
    pub fn admin(&self) -> String {
        self.add_user(ADMIN_TOKEN, "admin@thpt.edu.vn", Role::Admin, None);
        ADMIN_TOKEN.to_string()
    }

    pub fn add_department(&self, id: &str, name: &str) {
        self.conn()
            .execute(
                "INSERT INTO departments (id, name) VALUES (?1, ?2)",
                params![id, name],
            )
            .expect("insert department");
    }

    pub fn add_teacher(&self, id: &str, name: &str, department_id: Option<&str>, basic: u32) {
        self.conn()
            .execute(
                "INSERT INTO teachers (id, name, department_id, basic_teaching_lessons) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, department_id, basic],
            )
            .expect("insert teacher");
    }

    /// Adds a grade-10 class with `(subject id, subject name, lesson count)`
    /// entries in the given order; subjects are created when missing.
    pub fn add_class(&self, id: &str, name: &str, subjects: &[(&str, &str, u32)]) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO classes (id, name, grade) VALUES (?1, ?2, 10)",
            params![id, name],
        )
        .expect("insert class");
        for (position, (subject_id, subject_name, lessons)) in subjects.iter().enumerate() {
            conn.execute(
                "INSERT OR IGNORE INTO subjects (id, name) VALUES (?1, ?2)",
                params![subject_id, subject_name],
            )
            .expect("insert subject");
            conn.execute(
                "INSERT INTO class_subjects (class_id, subject_id, position, lesson_count) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, subject_id, position as i64, lessons],
            )
            .expect("insert class subject");
        }
    }

    pub fn add_assignment(&self, id: &str, teacher: &str, class: &str, subject: &str, lessons: u32) {
        self.conn()
            .execute(
                "INSERT INTO assignments (id, teacher_id, class_id, subject_id, completed_lessons) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, teacher, class, subject, lessons],
            )
            .expect("insert assignment");
    }
}
