use crate::db;
use common::model::department::SaveDepartment;
use rusqlite::{params, Connection};

/// `(id, name)` of every department, ordered by name.
pub fn load_departments(conn: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT id, name FROM departments ORDER BY name, id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect();
    rows
}

pub fn save_department(conn: &Connection, payload: &SaveDepartment) -> rusqlite::Result<String> {
    let id = payload.id.clone().unwrap_or_else(db::new_id);
    conn.execute(
        "INSERT INTO departments (id, name) VALUES (?1, ?2) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![id, payload.name.trim()],
    )?;
    Ok(id)
}

pub fn department_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn delete_department(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM departments WHERE id = ?1", params![id])? > 0)
}
