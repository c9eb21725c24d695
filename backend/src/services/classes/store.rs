use crate::db;
use crate::error::ApiError;
use common::model::class::{AssignmentEntry, Class, ClassSubject, SaveClass};
use common::model::subject::Subject;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

type SubjectKey = (String, String);

fn load_assignment_entries(
    conn: &Connection,
) -> rusqlite::Result<HashMap<SubjectKey, Vec<AssignmentEntry>>> {
    let mut stmt = conn.prepare(
        "SELECT a.class_id, a.subject_id, a.id, a.teacher_id, t.name, a.completed_lessons \
         FROM assignments a JOIN teachers t ON t.id = a.teacher_id \
         ORDER BY a.rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            (row.get::<_, String>(0)?, row.get::<_, String>(1)?),
            AssignmentEntry {
                assignment_id: row.get(2)?,
                teacher_id: row.get(3)?,
                teacher_name: row.get(4)?,
                completed_lessons: row.get(5)?,
            },
        ))
    })?;

    let mut entries: HashMap<SubjectKey, Vec<AssignmentEntry>> = HashMap::new();
    for row in rows {
        let (key, entry) = row?;
        entries.entry(key).or_default().push(entry);
    }
    Ok(entries)
}

fn load_class_subjects(
    conn: &Connection,
) -> rusqlite::Result<HashMap<String, Vec<ClassSubject>>> {
    let mut assignments = load_assignment_entries(conn)?;
    let mut stmt = conn.prepare(
        "SELECT cs.class_id, s.id, s.name, s.is_specialized, cs.lesson_count \
         FROM class_subjects cs JOIN subjects s ON s.id = cs.subject_id \
         ORDER BY cs.class_id, cs.position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Subject {
                id: row.get(1)?,
                name: row.get(2)?,
                is_specialized: row.get(3)?,
            },
            row.get::<_, u32>(4)?,
        ))
    })?;

    let mut by_class: HashMap<String, Vec<ClassSubject>> = HashMap::new();
    for row in rows {
        let (class_id, subject, lesson_count) = row?;
        let entries = assignments
            .remove(&(class_id.clone(), subject.id.clone()))
            .unwrap_or_default();
        by_class.entry(class_id).or_default().push(ClassSubject {
            subject,
            lesson_count,
            assignments: entries,
        });
    }
    Ok(by_class)
}

/// Every class with its ordered subject list and the assignments drawn
/// against each subject.
pub fn load_classes(conn: &Connection) -> rusqlite::Result<Vec<Class>> {
    let mut subjects = load_class_subjects(conn)?;
    let mut stmt =
        conn.prepare("SELECT id, name, grade, campus, size FROM classes ORDER BY grade, name")?;
    let classes = stmt
        .query_map([], |row| {
            Ok(Class {
                id: row.get(0)?,
                name: row.get(1)?,
                grade: row.get(2)?,
                campus: row.get(3)?,
                size: row.get(4)?,
                subjects: Vec::new(),
            })
        })?
        .map(|class| {
            class.map(|mut c| {
                c.subjects = subjects.remove(&c.id).unwrap_or_default();
                c
            })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(classes)
}

pub fn find_class(conn: &Connection, id: &str) -> rusqlite::Result<Option<Class>> {
    Ok(load_classes(conn)?.into_iter().find(|c| c.id == id))
}

pub fn class_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM classes WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

/// Name of a class subject and the lessons already assigned against it.
fn assigned_lessons(
    conn: &Connection,
    class_id: &str,
    subject_id: &str,
) -> rusqlite::Result<Option<(String, u32)>> {
    conn.query_row(
        "SELECT s.name, COALESCE(SUM(a.completed_lessons), 0) FROM subjects s \
         LEFT JOIN assignments a ON a.subject_id = s.id AND a.class_id = ?1 \
         WHERE s.id = ?2 GROUP BY s.id",
        params![class_id, subject_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Inserts or updates a class and replaces its subject list, keeping the
/// given order. Subjects dropped from the list lose their assignments; a kept
/// subject cannot go below the lessons already assigned to it.
pub fn save_class(conn: &mut Connection, payload: &SaveClass) -> Result<String, ApiError> {
    let id = payload.id.clone().unwrap_or_else(db::new_id);
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO classes (id, name, grade, campus, size) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, grade = excluded.grade, \
             campus = excluded.campus, size = excluded.size",
        params![id, payload.name.trim(), payload.grade, payload.campus, payload.size],
    )?;

    let existing: Vec<String> = tx
        .prepare("SELECT subject_id FROM class_subjects WHERE class_id = ?1")?
        .query_map(params![id], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for old in &existing {
        if !payload.subjects.iter().any(|s| &s.subject_id == old) {
            tx.execute(
                "DELETE FROM class_subjects WHERE class_id = ?1 AND subject_id = ?2",
                params![id, old],
            )?;
        }
    }

    for (position, entry) in payload.subjects.iter().enumerate() {
        if let Some((subject, assigned)) = assigned_lessons(&tx, &id, &entry.subject_id)? {
            if entry.lesson_count < assigned {
                return Err(ApiError::Conflict(format!(
                    "Lớp {} môn {} đã phân công {} tiết, không thể giảm số tiết xuống {}",
                    payload.name.trim(),
                    subject,
                    assigned,
                    entry.lesson_count
                )));
            }
        }
        tx.execute(
            "INSERT INTO class_subjects (class_id, subject_id, position, lesson_count) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(class_id, subject_id) DO UPDATE SET position = excluded.position, \
                 lesson_count = excluded.lesson_count",
            params![id, entry.subject_id, position as i64, entry.lesson_count],
        )?;
    }

    tx.commit()?;
    Ok(id)
}

pub fn delete_class(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    Ok(conn.execute("DELETE FROM classes WHERE id = ?1", params![id])? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestEnv;
    use common::model::class::ClassSubjectInput;

    #[test]
    fn subjects_keep_their_order_and_assignments() {
        let env = TestEnv::new();
        env.add_teacher("T1", "An", None, 340);
        env.add_class("C1", "10A1", &[("S2", "Văn", 12), ("S1", "Toán", 10)]);
        env.add_assignment("A1", "T1", "C1", "S1", 6);

        let conn = env.conn();
        let class = find_class(&conn, "C1").unwrap().unwrap();
        let order: Vec<_> = class.subjects.iter().map(|s| s.subject.id.as_str()).collect();
        assert_eq!(order, ["S2", "S1"]);
        assert_eq!(class.subject("S1").unwrap().remaining_lessons(), 4);
        assert_eq!(class.subject("S2").unwrap().remaining_lessons(), 12);
    }

    #[test]
    fn dropping_a_subject_removes_its_assignments() {
        let env = TestEnv::new();
        env.add_teacher("T1", "An", None, 340);
        env.add_class("C1", "10A1", &[("S1", "Toán", 10), ("S2", "Văn", 12)]);
        env.add_assignment("A1", "T1", "C1", "S1", 6);

        let mut conn = env.conn();
        save_class(
            &mut conn,
            &SaveClass {
                id: Some("C1".into()),
                name: "10A1".into(),
                grade: 10,
                campus: None,
                size: Some(42),
                subjects: vec![ClassSubjectInput {
                    subject_id: "S2".into(),
                    lesson_count: 14,
                }],
            },
        )
        .unwrap();

        let class = find_class(&conn, "C1").unwrap().unwrap();
        assert_eq!(class.subjects.len(), 1);
        assert_eq!(class.subjects[0].lesson_count, 14);
        let left: i64 = conn
            .query_row("SELECT COUNT(*) FROM assignments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(left, 0);
    }

    #[test]
    fn lesson_count_cannot_drop_below_assigned() {
        let env = TestEnv::new();
        env.add_teacher("T1", "An", None, 340);
        env.add_class("C1", "10A1", &[("S1", "Toán", 10)]);
        env.add_assignment("A1", "T1", "C1", "S1", 8);

        let mut conn = env.conn();
        let payload = |lesson_count| SaveClass {
            id: Some("C1".into()),
            name: "10A1".into(),
            grade: 10,
            campus: None,
            size: None,
            subjects: vec![ClassSubjectInput {
                subject_id: "S1".into(),
                lesson_count,
            }],
        };
        match save_class(&mut conn, &payload(3)) {
            Err(ApiError::Conflict(message)) => {
                assert!(message.contains("Toán"), "{}", message);
                assert!(message.contains("8 tiết"), "{}", message);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        let class = find_class(&conn, "C1").unwrap().unwrap();
        assert_eq!(class.subjects[0].lesson_count, 10);

        save_class(&mut conn, &payload(8)).unwrap();
        let class = find_class(&conn, "C1").unwrap().unwrap();
        assert_eq!(class.subjects[0].lesson_count, 8);
        assert_eq!(class.subjects[0].remaining_lessons(), 0);
    }
}
