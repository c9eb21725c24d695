use common::model::assignment::Assignment;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str =
    "id, teacher_id, class_id, subject_id, lessons_per_week, number_of_weeks, completed_lessons";

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        class_id: row.get(2)?,
        subject_id: row.get(3)?,
        lessons_per_week: row.get(4)?,
        number_of_weeks: row.get(5)?,
        completed_lessons: row.get(6)?,
    })
}

pub fn load_assignments(
    conn: &Connection,
    teacher_id: Option<&str>,
) -> rusqlite::Result<Vec<Assignment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM assignments WHERE ?1 IS NULL OR teacher_id = ?1 ORDER BY rowid",
        COLUMNS
    ))?;
    let assignments = stmt
        .query_map(params![teacher_id], assignment_from_row)?
        .collect();
    assignments
}

pub fn find_assignment(conn: &Connection, id: &str) -> rusqlite::Result<Option<Assignment>> {
    conn.query_row(
        &format!("SELECT {} FROM assignments WHERE id = ?1", COLUMNS),
        params![id],
        assignment_from_row,
    )
    .optional()
}

pub fn insert_assignment(conn: &Connection, a: &Assignment) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO assignments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            COLUMNS
        ),
        params![
            a.id,
            a.teacher_id,
            a.class_id,
            a.subject_id,
            a.lessons_per_week,
            a.number_of_weeks,
            a.completed_lessons
        ],
    )?;
    Ok(())
}

pub fn update_assignment(conn: &Connection, a: &Assignment) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE assignments SET teacher_id = ?2, class_id = ?3, subject_id = ?4, \
             lessons_per_week = ?5, number_of_weeks = ?6, completed_lessons = ?7 \
         WHERE id = ?1",
        params![
            a.id,
            a.teacher_id,
            a.class_id,
            a.subject_id,
            a.lessons_per_week,
            a.number_of_weeks,
            a.completed_lessons
        ],
    )?;
    Ok(())
}

pub fn delete_assignment(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM assignments WHERE id = ?1", params![id])? > 0)
}
