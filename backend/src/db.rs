//! SQLite storage. Handlers open a fresh connection per request through
//! [`open`]; [`init`] creates the schema once at startup.

use crate::config::AppConfig;
use log::info;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS departments (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS teachers (
    id                     TEXT PRIMARY KEY,
    name                   TEXT NOT NULL,
    department_id          TEXT REFERENCES departments(id) ON DELETE SET NULL,
    employment_type        TEXT NOT NULL DEFAULT 'full_time',
    basic_teaching_lessons INTEGER NOT NULL DEFAULT 0,
    homeroom_class_id      TEXT,
    homeroom_reduction     INTEGER
);
CREATE TABLE IF NOT EXISTS teacher_reductions (
    teacher_id      TEXT NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
    position        INTEGER NOT NULL,
    reason          TEXT NOT NULL,
    reduced_lessons INTEGER NOT NULL,
    PRIMARY KEY (teacher_id, position)
);
CREATE TABLE IF NOT EXISTS subjects (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    is_specialized INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS classes (
    id     TEXT PRIMARY KEY,
    name   TEXT NOT NULL UNIQUE,
    grade  INTEGER NOT NULL,
    campus TEXT,
    size   INTEGER
);
CREATE TABLE IF NOT EXISTS class_subjects (
    class_id     TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
    subject_id   TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
    position     INTEGER NOT NULL,
    lesson_count INTEGER NOT NULL,
    PRIMARY KEY (class_id, subject_id)
);
CREATE TABLE IF NOT EXISTS assignments (
    id                TEXT PRIMARY KEY,
    teacher_id        TEXT NOT NULL REFERENCES teachers(id) ON DELETE CASCADE,
    class_id          TEXT NOT NULL,
    subject_id        TEXT NOT NULL,
    lessons_per_week  INTEGER,
    number_of_weeks   INTEGER,
    completed_lessons INTEGER NOT NULL,
    FOREIGN KEY (class_id, subject_id)
        REFERENCES class_subjects(class_id, subject_id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS users (
    token         TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    role          TEXT NOT NULL,
    teacher_id    TEXT REFERENCES teachers(id) ON DELETE SET NULL,
    department_id TEXT REFERENCES departments(id) ON DELETE SET NULL
);
CREATE TABLE IF NOT EXISTS import_uploads (
    md5           TEXT PRIMARY KEY,
    rows_read     INTEGER NOT NULL,
    lessons_total INTEGER NOT NULL
);
";

pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Creates the schema and provisions the bootstrap admin account.
pub fn init(config: &AppConfig) -> rusqlite::Result<()> {
    let conn = open(&config.database_path)?;
    conn.execute_batch(SCHEMA)?;

    if let Some(token) = &config.admin_token {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (token, email, role) VALUES (?1, ?2, 'admin')",
            params![token, config.admin_email],
        )?;
        if inserted > 0 {
            info!("Provisioned bootstrap admin account {}", config.admin_email);
        }
    }
    Ok(())
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
