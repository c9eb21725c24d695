use crate::db;
use common::model::teacher::{
    EmploymentType, HomeroomReduction, Reduction, SaveTeacher, Teacher, TeacherName,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

const TEACHER_COLUMNS: &str = "t.id, t.name, t.department_id, t.employment_type, \
     t.basic_teaching_lessons, t.homeroom_class_id, t.homeroom_reduction, \
     COALESCE((SELECT SUM(a.completed_lessons) FROM assignments a WHERE a.teacher_id = t.id), 0)";

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    let employment: String = row.get(3)?;
    let homeroom_lessons: Option<u32> = row.get(6)?;
    let homeroom_class: Option<String> = row.get(5)?;
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        department_id: row.get(2)?,
        employment_type: EmploymentType::parse(&employment).unwrap_or_default(),
        basic_teaching_lessons: row.get(4)?,
        reductions: Vec::new(),
        homeroom_reduction: homeroom_lessons.map(|reduced_lessons| HomeroomReduction {
            class_id: homeroom_class,
            reduced_lessons,
        }),
        declared_lessons: row.get(7)?,
    })
}

fn load_reductions(conn: &Connection) -> rusqlite::Result<HashMap<String, Vec<Reduction>>> {
    let mut stmt = conn.prepare(
        "SELECT teacher_id, reason, reduced_lessons FROM teacher_reductions \
         ORDER BY teacher_id, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Reduction {
                reason: row.get(1)?,
                reduced_lessons: row.get(2)?,
            },
        ))
    })?;

    let mut by_teacher: HashMap<String, Vec<Reduction>> = HashMap::new();
    for row in rows {
        let (teacher_id, reduction) = row?;
        by_teacher.entry(teacher_id).or_default().push(reduction);
    }
    Ok(by_teacher)
}

/// Every teacher with reductions and declared lessons filled in, ordered by name.
pub fn load_teachers(conn: &Connection) -> rusqlite::Result<Vec<Teacher>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM teachers t ORDER BY t.name, t.id",
        TEACHER_COLUMNS
    ))?;
    let mut teachers = stmt
        .query_map([], teacher_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut reductions = load_reductions(conn)?;
    for teacher in &mut teachers {
        teacher.reductions = reductions.remove(&teacher.id).unwrap_or_default();
    }
    Ok(teachers)
}

pub fn find_teacher(conn: &Connection, id: &str) -> rusqlite::Result<Option<Teacher>> {
    let teacher = conn
        .query_row(
            &format!("SELECT {} FROM teachers t WHERE t.id = ?1", TEACHER_COLUMNS),
            params![id],
            teacher_from_row,
        )
        .optional()?;

    let Some(mut teacher) = teacher else {
        return Ok(None);
    };
    let mut stmt = conn.prepare(
        "SELECT reason, reduced_lessons FROM teacher_reductions \
         WHERE teacher_id = ?1 ORDER BY position",
    )?;
    teacher.reductions = stmt
        .query_map(params![id], |row| {
            Ok(Reduction {
                reason: row.get(0)?,
                reduced_lessons: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Some(teacher))
}

pub fn teacher_names(
    conn: &Connection,
    department_id: Option<&str>,
) -> rusqlite::Result<Vec<TeacherName>> {
    let mut stmt = conn.prepare(
        "SELECT id, name FROM teachers \
         WHERE ?1 IS NULL OR department_id = ?1 ORDER BY name, id",
    )?;
    let names = stmt
        .query_map(params![department_id], |row| {
            Ok(TeacherName {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect();
    names
}

/// Inserts or replaces a teacher. Reductions are replaced wholesale.
pub fn save_teacher(conn: &mut Connection, payload: &SaveTeacher) -> rusqlite::Result<String> {
    let id = payload.id.clone().unwrap_or_else(db::new_id);
    let tx = conn.transaction()?;

    let homeroom = payload.homeroom_reduction.as_ref();
    tx.execute(
        "INSERT INTO teachers (id, name, department_id, employment_type, basic_teaching_lessons, \
             homeroom_class_id, homeroom_reduction) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, \
             department_id = excluded.department_id, \
             employment_type = excluded.employment_type, \
             basic_teaching_lessons = excluded.basic_teaching_lessons, \
             homeroom_class_id = excluded.homeroom_class_id, \
             homeroom_reduction = excluded.homeroom_reduction",
        params![
            id,
            payload.name.trim(),
            payload.department_id,
            payload.employment_type.as_str(),
            payload.basic_teaching_lessons,
            homeroom.and_then(|h| h.class_id.clone()),
            homeroom.map(|h| h.reduced_lessons),
        ],
    )?;

    tx.execute(
        "DELETE FROM teacher_reductions WHERE teacher_id = ?1",
        params![id],
    )?;
    for (position, reduction) in payload.reductions.iter().enumerate() {
        tx.execute(
            "INSERT INTO teacher_reductions (teacher_id, position, reason, reduced_lessons) \
             VALUES (?1, ?2, ?3, ?4)",
            params![id, position as i64, reduction.reason, reduction.reduced_lessons],
        )?;
    }

    tx.commit()?;
    Ok(id)
}

pub fn teacher_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teachers WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn delete_teacher(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM teachers WHERE id = ?1", params![id])? > 0)
}
