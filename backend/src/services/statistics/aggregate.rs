//! Dashboard figures computed from loaded teachers and classes.
//!
//! Nothing here touches the database; the handlers and the report jobs load
//! the rows and hand them in.

use common::load;
use common::model::class::Class;
use common::model::statistics::{
    ClassStatistics, ClassSubjectStatistics, DepartmentStatistics, LoadSummary,
    SubjectStatistics, TeacherShare,
};
use common::model::subject::Subject;
use common::model::teacher::Teacher;
use rayon::prelude::*;
use std::collections::HashSet;

/// Load summaries in the same order as `teachers`.
pub fn teacher_summaries(teachers: &[Teacher]) -> Vec<LoadSummary> {
    teachers.par_iter().map(load::summarize).collect()
}

/// One entry per department, in the given order. Teachers without a
/// department are not counted anywhere.
pub fn department_statistics(
    departments: &[(String, String)],
    teachers: &[Teacher],
) -> Vec<DepartmentStatistics> {
    let summaries = teacher_summaries(teachers);
    departments
        .iter()
        .map(|(id, name)| {
            let members: Vec<&LoadSummary> = summaries
                .iter()
                .filter(|s| s.department_id.as_deref() == Some(id.as_str()))
                .collect();
            let total_final_basic_lessons: i64 =
                members.iter().map(|s| s.final_basic_lessons).sum();
            let total_declared_lessons: u32 = members.iter().map(|s| s.declared_lessons).sum();
            DepartmentStatistics {
                department_id: id.clone(),
                name: name.clone(),
                teacher_count: members.len() as u32,
                total_final_basic_lessons,
                total_declared_lessons,
                total_excess_lessons: members.iter().map(|s| s.excess_lessons).sum(),
                completion_percentage: load::completion_percentage(
                    total_declared_lessons,
                    total_final_basic_lessons,
                ),
            }
        })
        .collect()
}

fn teacher_shares(entry: &common::model::class::ClassSubject) -> Vec<TeacherShare> {
    let mut shares: Vec<TeacherShare> = Vec::new();
    for a in &entry.assignments {
        match shares.iter_mut().find(|s| s.teacher_id == a.teacher_id) {
            Some(share) => share.completed_lessons += a.completed_lessons,
            None => shares.push(TeacherShare {
                teacher_id: a.teacher_id.clone(),
                teacher_name: a.teacher_name.clone(),
                completed_lessons: a.completed_lessons,
            }),
        }
    }
    shares
}

pub fn class_statistics(classes: &[Class]) -> Vec<ClassStatistics> {
    classes
        .iter()
        .map(|class| {
            let subjects: Vec<ClassSubjectStatistics> = class
                .subjects
                .iter()
                .map(|entry| ClassSubjectStatistics {
                    subject_id: entry.subject.id.clone(),
                    subject_name: entry.subject.name.clone(),
                    declared_lessons: entry.lesson_count,
                    assigned_lessons: entry.assigned_lessons(),
                    remaining_lessons: entry.remaining_lessons(),
                    teachers: teacher_shares(entry),
                })
                .collect();
            ClassStatistics {
                class_id: class.id.clone(),
                name: class.name.clone(),
                grade: class.grade,
                campus: class.campus.clone(),
                declared_lessons: subjects.iter().map(|s| s.declared_lessons).sum(),
                assigned_lessons: subjects.iter().map(|s| s.assigned_lessons).sum(),
                remaining_lessons: subjects.iter().map(|s| s.remaining_lessons).sum(),
                subjects,
            }
        })
        .collect()
}

pub fn subject_statistics(subjects: &[Subject], classes: &[Class]) -> Vec<SubjectStatistics> {
    subjects
        .iter()
        .map(|subject| {
            let entries: Vec<_> = classes
                .iter()
                .filter_map(|class| class.subject(&subject.id))
                .collect();
            let teachers: HashSet<&str> = entries
                .iter()
                .flat_map(|e| e.assignments.iter().map(|a| a.teacher_id.as_str()))
                .collect();
            SubjectStatistics {
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                is_specialized: subject.is_specialized,
                class_count: entries.len() as u32,
                teacher_count: teachers.len() as u32,
                declared_lessons: entries.iter().map(|e| e.lesson_count).sum(),
                assigned_lessons: entries.iter().map(|e| e.assigned_lessons()).sum(),
                remaining_lessons: entries.iter().map(|e| e.remaining_lessons()).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::class::{AssignmentEntry, ClassSubject};
    use common::model::teacher::{EmploymentType, Reduction};

    fn teacher(id: &str, department: Option<&str>, basic: u32, reduced: u32, declared: u32) -> Teacher {
        Teacher {
            id: id.into(),
            name: id.into(),
            department_id: department.map(String::from),
            employment_type: EmploymentType::FullTime,
            basic_teaching_lessons: basic,
            reductions: if reduced > 0 {
                vec![Reduction {
                    reason: "Tổ trưởng".into(),
                    reduced_lessons: reduced,
                }]
            } else {
                Vec::new()
            },
            homeroom_reduction: None,
            declared_lessons: declared,
        }
    }

    fn entry(id: &str, lesson_count: u32, shares: &[(&str, u32)]) -> ClassSubject {
        ClassSubject {
            subject: Subject {
                id: id.into(),
                name: id.into(),
                is_specialized: id == "S2",
            },
            lesson_count,
            assignments: shares
                .iter()
                .enumerate()
                .map(|(i, &(teacher, lessons))| AssignmentEntry {
                    assignment_id: format!("{id}-{i}"),
                    teacher_id: teacher.into(),
                    teacher_name: teacher.into(),
                    completed_lessons: lessons,
                })
                .collect(),
        }
    }

    fn classes() -> Vec<Class> {
        vec![
            Class {
                id: "C1".into(),
                name: "10A1".into(),
                grade: 10,
                campus: Some("Cơ sở 1".into()),
                size: Some(40),
                subjects: vec![entry("S1", 10, &[("T1", 4), ("T1", 2), ("T2", 3)]), entry("S2", 6, &[])],
            },
            Class {
                id: "C2".into(),
                name: "11B1".into(),
                grade: 11,
                campus: None,
                size: None,
                subjects: vec![entry("S1", 8, &[("T3", 8)])],
            },
        ]
    }

    #[test]
    fn departments_sum_their_members() {
        let teachers = vec![
            teacher("T1", Some("D1"), 20, 4, 20),
            teacher("T2", Some("D1"), 10, 0, 5),
            teacher("T3", Some("D2"), 5, 10, 3),
            teacher("T4", None, 17, 0, 0),
        ];
        let departments = vec![
            ("D1".to_string(), "Toán".to_string()),
            ("D2".to_string(), "Văn".to_string()),
            ("D3".to_string(), "Sử".to_string()),
        ];
        let stats = department_statistics(&departments, &teachers);

        assert_eq!(stats[0].teacher_count, 2);
        assert_eq!(stats[0].total_final_basic_lessons, 26);
        assert_eq!(stats[0].total_declared_lessons, 25);
        assert_eq!(stats[0].total_excess_lessons, 4);
        assert_eq!(stats[0].completion_percentage, 96.15);

        // reductions above the quota make the required total negative
        assert_eq!(stats[1].total_final_basic_lessons, -5);
        assert_eq!(stats[1].completion_percentage, 0.0);

        assert_eq!(stats[2].teacher_count, 0);
        assert_eq!(stats[2].completion_percentage, 0.0);
    }

    #[test]
    fn summaries_keep_teacher_order() {
        let teachers: Vec<Teacher> = (0..50)
            .map(|i| teacher(&format!("T{i:02}"), None, 17, 0, i))
            .collect();
        let summaries = teacher_summaries(&teachers);
        assert_eq!(summaries.len(), 50);
        assert!(summaries
            .iter()
            .zip(&teachers)
            .all(|(s, t)| s.teacher_id == t.id && s.declared_lessons == t.declared_lessons));
    }

    #[test]
    fn class_figures_merge_shares_per_teacher() {
        let stats = class_statistics(&classes());
        let c1 = &stats[0];
        assert_eq!((c1.declared_lessons, c1.assigned_lessons, c1.remaining_lessons), (16, 9, 7));
        let math = &c1.subjects[0];
        assert_eq!(math.teachers.len(), 2);
        assert_eq!(math.teachers[0].teacher_id, "T1");
        assert_eq!(math.teachers[0].completed_lessons, 6);
        assert_eq!(c1.subjects[1].teachers.len(), 0);
    }

    #[test]
    fn subject_figures_span_classes() {
        let subjects = vec![
            Subject {
                id: "S1".into(),
                name: "Toán".into(),
                is_specialized: false,
            },
            Subject {
                id: "S2".into(),
                name: "Toán chuyên".into(),
                is_specialized: true,
            },
            Subject {
                id: "S3".into(),
                name: "Tin".into(),
                is_specialized: false,
            },
        ];
        let stats = subject_statistics(&subjects, &classes());
        assert_eq!(stats[0].class_count, 2);
        assert_eq!(stats[0].teacher_count, 3);
        assert_eq!(stats[0].declared_lessons, 18);
        assert_eq!(stats[0].assigned_lessons, 17);
        assert_eq!(stats[0].remaining_lessons, 1);
        assert_eq!(stats[1].class_count, 1);
        assert_eq!(stats[1].remaining_lessons, 6);
        assert_eq!(stats[2].class_count, 0);
    }
}
