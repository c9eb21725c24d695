use crate::db;
use common::model::subject::{SaveSubject, Subject};
use rusqlite::{params, Connection};

pub fn load_subjects(conn: &Connection) -> rusqlite::Result<Vec<Subject>> {
    let mut stmt = conn.prepare("SELECT id, name, is_specialized FROM subjects ORDER BY name, id")?;
    let subjects = stmt
        .query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
                is_specialized: row.get(2)?,
            })
        })?
        .collect();
    subjects
}

pub fn save_subject(conn: &Connection, payload: &SaveSubject) -> rusqlite::Result<String> {
    let id = payload.id.clone().unwrap_or_else(db::new_id);
    conn.execute(
        "INSERT INTO subjects (id, name, is_specialized) VALUES (?1, ?2, ?3) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, \
             is_specialized = excluded.is_specialized",
        params![id, payload.name.trim(), payload.is_specialized],
    )?;
    Ok(id)
}

pub fn subject_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn delete_subject(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM subjects WHERE id = ?1", params![id])? > 0)
}
