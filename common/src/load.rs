//! Teaching-load arithmetic.
//!
//! Every listing, dashboard and report derives its figures from these
//! functions so the numbers agree everywhere a teacher is shown.

use crate::model::statistics::LoadSummary;
use crate::model::teacher::Teacher;

/// Adds the two kinds of reduction; an absent part counts as zero.
pub fn total_reduced(teacher_reduction: Option<u32>, homeroom_reduction: Option<u32>) -> u32 {
    teacher_reduction.unwrap_or(0) + homeroom_reduction.unwrap_or(0)
}

pub fn total_reduced_lessons(teacher: &Teacher) -> u32 {
    total_reduced(
        Some(teacher.teacher_reduction()),
        teacher
            .homeroom_reduction
            .as_ref()
            .map(|h| h.reduced_lessons),
    )
}

/// Required lessons after reductions. Negative when reductions exceed the
/// base quota.
pub fn final_basic_lessons(teacher: &Teacher) -> i64 {
    i64::from(teacher.basic_teaching_lessons) - i64::from(total_reduced_lessons(teacher))
}

/// `declared / final_basic * 100`, capped at 100 and rounded to 2 decimals.
pub fn completion_percentage(declared: u32, final_basic: i64) -> f64 {
    if final_basic <= 0 {
        return 0.0;
    }
    let pct = (f64::from(declared) / final_basic as f64 * 100.0).min(100.0);
    (pct * 100.0).round() / 100.0
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn excess_lessons(declared: u32, final_basic: i64) -> u32 {
    (i64::from(declared) - final_basic).max(0) as u32
}

/// Lessons still missing to reach the final basic quota.
pub fn remaining_lessons(declared: u32, final_basic: i64) -> u32 {
    (final_basic - i64::from(declared)).max(0) as u32
}

pub fn summarize(teacher: &Teacher) -> LoadSummary {
    let final_basic = final_basic_lessons(teacher);
    let declared = teacher.declared_lessons;
    LoadSummary {
        teacher_id: teacher.id.clone(),
        name: teacher.name.clone(),
        department_id: teacher.department_id.clone(),
        basic_teaching_lessons: teacher.basic_teaching_lessons,
        total_reduced_lessons: total_reduced_lessons(teacher),
        final_basic_lessons: final_basic,
        declared_lessons: declared,
        remaining_lessons: remaining_lessons(declared, final_basic),
        excess_lessons: excess_lessons(declared, final_basic),
        completion_percentage: completion_percentage(declared, final_basic),
    }
}

/// Drops placeholder and non-teaching staff records from a listing.
pub fn retain_teaching_staff(teachers: &mut Vec<Teacher>, excluded_ids: &[String]) {
    teachers.retain(|t| !excluded_ids.iter().any(|id| id == &t.id));
}
