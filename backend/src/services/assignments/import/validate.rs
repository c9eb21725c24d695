//! Checks parsed spreadsheet rows against the teacher and class lists.
//!
//! Errors are collected rather than returned early so the whole sheet can be
//! corrected in one pass. Accepted entries draw down the class-subject
//! capacity, so later rows see what earlier rows took.

use super::parse::ImportRow;
use crate::services::assignments::capacity::CapacityLedger;
use common::model::assignment::{ClassLessons, TeacherAssignmentBatch};
use common::model::class::Class;
use common::model::import::{ImportError, ImportReport};
use common::model::teacher::TeacherName;
use std::collections::HashMap;

/// Whole, positive lesson counts only; spreadsheet exports may write `8.0`.
pub fn parse_lessons(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    if !value.is_finite() || value <= 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    Some(value as u32)
}

fn find_teacher<'a>(teachers: &'a [TeacherName], name: &str) -> Option<&'a TeacherName> {
    teachers.iter().find(|t| t.name.trim() == name)
}

fn find_class<'a>(classes: &'a [Class], code: &str) -> Option<&'a Class> {
    classes
        .iter()
        .find(|c| c.name.trim().eq_ignore_ascii_case(code))
}

pub fn validate_rows(
    rows: &[ImportRow],
    teachers: &[TeacherName],
    classes: &[Class],
) -> ImportReport {
    let mut ledger = CapacityLedger::from_classes(classes);
    let mut errors = Vec::new();
    let mut batches: Vec<TeacherAssignmentBatch> = Vec::new();
    // (teacher id, upper-cased class code) -> row of the accepted occurrence
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    let mut fail = |row: usize, message: String| errors.push(ImportError { row, message });

    for row in rows {
        let name = row.teacher_name.trim();
        if name.is_empty() {
            fail(row.row, "Thiếu tên giáo viên".to_string());
            continue;
        }
        let Some(teacher) = find_teacher(teachers, name) else {
            fail(row.row, format!("Không tìm thấy giáo viên \"{}\"", name));
            continue;
        };

        for cell in &row.classes {
            let code = cell.class_code.trim();
            if code.is_empty() {
                continue;
            }

            let key = (teacher.id.clone(), code.to_uppercase());
            if let Some(&first_row) = seen.get(&key) {
                let message = if first_row == row.row {
                    format!(
                        "Lớp {} bị lặp lại trong cùng dòng của giáo viên {}",
                        code, teacher.name
                    )
                } else {
                    format!(
                        "Lớp {} đã được phân công cho giáo viên {} ở dòng {}",
                        code, teacher.name, first_row
                    )
                };
                fail(row.row, message);
                continue;
            }

            let Some(lessons) = parse_lessons(&cell.lessons) else {
                fail(
                    row.row,
                    format!(
                        "Số tiết \"{}\" của lớp {} không hợp lệ (phải là số nguyên dương)",
                        cell.lessons, code
                    ),
                );
                continue;
            };

            let Some(class) = find_class(classes, code) else {
                fail(row.row, format!("Không tìm thấy lớp {}", code));
                continue;
            };

            let Some((subject, left)) = ledger.first_open_subject(class) else {
                fail(
                    row.row,
                    format!("Lớp {} không còn môn học nào còn số tiết trống", code),
                );
                continue;
            };
            if lessons > left {
                fail(
                    row.row,
                    format!(
                        "Số tiết ({}) vượt quá số tiết còn lại ({}) của lớp {} môn {}",
                        lessons, left, code, subject.name
                    ),
                );
                continue;
            }
            if ledger.take(&class.id, &subject.id, lessons).is_err() {
                continue;
            }
            seen.insert(key, row.row);

            let entry = ClassLessons {
                class_id: class.id.clone(),
                subject_id: subject.id.clone(),
                completed_lessons: lessons,
            };
            match batches.iter_mut().find(|b| b.teacher_id == teacher.id) {
                Some(batch) => batch.classes.push(entry),
                None => batches.push(TeacherAssignmentBatch {
                    teacher_id: teacher.id.clone(),
                    classes: vec![entry],
                }),
            }
        }
    }

    ImportReport {
        batches,
        errors,
        rows_read: rows.len(),
        already_submitted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assignments::import::parse::{parse_sheet, ClassCell};
    use common::model::class::{AssignmentEntry, ClassSubject};
    use common::model::subject::Subject;

    fn teachers() -> Vec<TeacherName> {
        vec![
            TeacherName {
                id: "T1".into(),
                name: "Nguyen Van A".into(),
            },
            TeacherName {
                id: "T2".into(),
                name: "Tran Thi B".into(),
            },
        ]
    }

    fn subject(id: &str, name: &str, lesson_count: u32, taken: &[u32]) -> ClassSubject {
        ClassSubject {
            subject: Subject {
                id: id.into(),
                name: name.into(),
                is_specialized: false,
            },
            lesson_count,
            assignments: taken
                .iter()
                .enumerate()
                .map(|(i, &lessons)| AssignmentEntry {
                    assignment_id: format!("A{i}"),
                    teacher_id: "T9".into(),
                    teacher_name: "Someone".into(),
                    completed_lessons: lessons,
                })
                .collect(),
        }
    }

    fn class(id: &str, name: &str, subjects: Vec<ClassSubject>) -> Class {
        Class {
            id: id.into(),
            name: name.into(),
            grade: 10,
            campus: None,
            size: None,
            subjects,
        }
    }

    fn row(n: usize, teacher: &str, cells: &[(&str, &str)]) -> ImportRow {
        ImportRow {
            row: n,
            teacher_name: teacher.into(),
            classes: cells
                .iter()
                .enumerate()
                .map(|(i, &(code, lessons))| ClassCell {
                    group: i as u32 + 1,
                    class_code: code.into(),
                    lessons: lessons.into(),
                })
                .collect(),
        }
    }

    #[test]
    fn end_to_end_sheet_produces_one_batch() {
        let sheet = "Tên giáo viên,Mã lớp 1,Số tiết 1\nNguyen Van A,10A1,8\n";
        let rows = parse_sheet(sheet.as_bytes()).unwrap();
        let teachers = vec![TeacherName {
            id: "T1".into(),
            name: "Nguyen Van A".into(),
        }];
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];

        let report = validate_rows(&rows, &teachers, &classes);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(
            report.batches,
            vec![TeacherAssignmentBatch {
                teacher_id: "T1".into(),
                classes: vec![ClassLessons {
                    class_id: "C1".into(),
                    subject_id: "S1".into(),
                    completed_lessons: 8,
                }],
            }]
        );
        assert!(report.can_submit());
    }

    #[test]
    fn request_above_remaining_capacity_reports_the_remainder() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[6])])];

        let rejected = validate_rows(&[row(2, "Nguyen Van A", &[("10A1", "5")])], &teachers(), &classes);
        assert_eq!(rejected.errors.len(), 1);
        assert!(rejected.errors[0].message.contains("còn lại (4)"), "{}", rejected.errors[0]);
        assert!(rejected.batches.is_empty());

        let accepted = validate_rows(&[row(2, "Nguyen Van A", &[("10A1", "4")])], &teachers(), &classes);
        assert!(accepted.errors.is_empty());
        assert_eq!(accepted.batches[0].classes[0].completed_lessons, 4);
    }

    #[test]
    fn repeated_class_for_a_teacher_is_reported_once() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [
            row(2, "Nguyen Van A", &[("10A1", "3")]),
            row(3, "Nguyen Van A", &[("10a1", "2")]),
        ];
        let report = validate_rows(&rows, &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert!(report.errors[0].message.contains("đã được phân công"));
        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.batches[0].classes.len(), 1);
        assert_eq!(report.batches[0].classes[0].completed_lessons, 3);
    }

    #[test]
    fn rejected_occurrence_does_not_block_a_later_one() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [
            row(2, "Nguyen Van A", &[("10A1", "abc")]),
            row(3, "Nguyen Van A", &[("10A1", "3")]),
        ];
        let report = validate_rows(&rows, &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 2);
        assert_eq!(report.batches[0].classes[0].completed_lessons, 3);
    }

    #[test]
    fn repeat_within_one_row_names_the_row_itself() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [row(2, "Nguyen Van A", &[("10A1", "3"), ("10A1", "2")])];
        let report = validate_rows(&rows, &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("trong cùng dòng"));
        assert_eq!(report.batches[0].classes.len(), 1);
    }

    #[test]
    fn unknown_teacher_contributes_nothing() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [row(2, "Le Van Z", &[("10A1", "3")])];
        let report = validate_rows(&rows, &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("Le Van Z"));
        assert!(report.batches.is_empty());
        assert!(!report.can_submit());
    }

    #[test]
    fn missing_teacher_name_excludes_the_row() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let report = validate_rows(&[row(4, "  ", &[("10A1", "3")])], &teachers(), &classes);
        assert_eq!(report.errors, vec![ImportError {
            row: 4,
            message: "Thiếu tên giáo viên".into()
        }]);
    }

    #[test]
    fn bad_lesson_counts_and_unknown_classes() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [row(
            2,
            "Nguyen Van A",
            &[("10A1", "0"), ("10A2", "3"), ("10A3", "abc"), ("", "7")],
        )];
        let report = validate_rows(&rows, &teachers(), &classes);
        let messages: Vec<_> = report.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages.len(), 3, "{:?}", messages);
        assert!(messages[0].contains("\"0\""));
        assert!(messages[1].contains("Không tìm thấy lớp 10A2"));
        assert!(messages[2].contains("\"abc\""));
        assert!(report.batches.is_empty());
    }

    #[test]
    fn first_subject_with_room_is_chosen() {
        let classes = vec![class(
            "C1",
            "10A1",
            vec![subject("S1", "Toán", 4, &[4]), subject("S2", "Lý", 6, &[])],
        )];
        let report = validate_rows(&[row(2, "Tran Thi B", &[("10A1", "5")])], &teachers(), &classes);
        assert!(report.errors.is_empty());
        assert_eq!(report.batches[0].classes[0].subject_id, "S2");
    }

    #[test]
    fn full_class_has_no_open_subject() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 4, &[4])])];
        let report = validate_rows(&[row(2, "Tran Thi B", &[("10A1", "1")])], &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("không còn môn học"));
    }

    #[test]
    fn earlier_rows_consume_capacity() {
        let classes = vec![class("C1", "10A1", vec![subject("S1", "Toán", 10, &[])])];
        let rows = [
            row(2, "Nguyen Van A", &[("10A1", "7")]),
            row(3, "Tran Thi B", &[("10A1", "4")]),
        ];
        let report = validate_rows(&rows, &teachers(), &classes);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 3);
        assert!(report.errors[0].message.contains("còn lại (3)"));
    }

    #[test]
    fn lesson_cells_must_be_whole_positive_numbers() {
        assert_eq!(parse_lessons("8"), Some(8));
        assert_eq!(parse_lessons(" 8.0 "), Some(8));
        assert_eq!(parse_lessons("8,0"), Some(8));
        assert_eq!(parse_lessons("8.5"), None);
        assert_eq!(parse_lessons("-2"), None);
        assert_eq!(parse_lessons("0"), None);
        assert_eq!(parse_lessons(""), None);
        assert_eq!(parse_lessons("NaN"), None);
    }
}
