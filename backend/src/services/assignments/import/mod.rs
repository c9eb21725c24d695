//! Spreadsheet import of assignments.
//!
//! Both endpoints take a `multipart/form-data` body with a `file` part holding
//! the CSV export of the sheet. `preview` only reports; `submit` re-validates
//! against the current store and writes through the bulk path.

pub mod parse;
pub mod preview;
pub mod submit;
pub mod validate;

use crate::auth;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::classes::store as class_store;
use crate::services::teachers::store as teacher_store;
use actix_multipart::Multipart;
use common::model::import::ImportReport;
use common::model::user::User;
use futures_util::StreamExt;
use md5::Context;
use rusqlite::{params, Connection, OptionalExtension};

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub md5: String,
}

/// Reads the `file` part of the request, hashing it as it streams in.
pub async fn read_upload(mut payload: Multipart) -> Result<Upload, ApiError> {
    let mut upload: Option<Upload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some("file") {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(ApiError::BadRequest(
                "Tệp phải có đuôi .csv (xuất từ bảng tính)".to_string(),
            ));
        }

        let mut hasher = Context::new();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::BadRequest("Tệp tải lên quá lớn".to_string()));
            }
            hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }
        upload = Some(Upload {
            file_name,
            bytes,
            md5: format!("{:x}", hasher.finalize()),
        });
    }

    upload.ok_or_else(|| ApiError::BadRequest("Thiếu tệp tải lên".to_string()))
}

/// Parses and validates an upload against the teachers and classes in store.
/// Department leaders can only name teachers of their own department.
pub fn check_upload(
    conn: &Connection,
    config: &AppConfig,
    user: &User,
    upload: &Upload,
) -> Result<ImportReport, ApiError> {
    let department = auth::department_scope(user)?;
    let rows = parse::parse_sheet(&upload.bytes)?;
    let mut teachers = teacher_store::teacher_names(conn, department)?;
    teachers.retain(|t| !config.excluded_teacher_ids.contains(&t.id));
    let classes = class_store::load_classes(conn)?;

    let mut report = validate::validate_rows(&rows, &teachers, &classes);
    report.already_submitted = was_submitted(conn, &upload.md5)?;
    Ok(report)
}

fn was_submitted(conn: &Connection, md5: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM import_uploads WHERE md5 = ?1",
        params![md5],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn record_submission(conn: &Connection, md5: &str, report: &ImportReport) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO import_uploads (md5, rows_read, lessons_total) VALUES (?1, ?2, ?3)",
        params![md5, report.rows_read as i64, report.accepted_lessons()],
    )?;
    Ok(())
}
