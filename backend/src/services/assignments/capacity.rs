//! Remaining-lesson bookkeeping for class-subjects.
//!
//! A [`CapacityLedger`] starts from the stored assignments and is drawn down
//! as new lessons are accepted, so a batch never pushes a class-subject past
//! its declared lesson count.

use common::model::class::{Class, ClassSubject};
use common::model::subject::Subject;
use std::collections::HashMap;

pub struct CapacityLedger {
    remaining: HashMap<(String, String), u32>,
}

impl CapacityLedger {
    pub fn from_classes(classes: &[Class]) -> Self {
        let remaining = classes
            .iter()
            .flat_map(|class| {
                class.subjects.iter().map(move |entry| {
                    (
                        (class.id.clone(), entry.subject.id.clone()),
                        entry.remaining_lessons(),
                    )
                })
            })
            .collect();
        CapacityLedger { remaining }
    }

    pub fn remaining(&self, class_id: &str, subject_id: &str) -> Option<u32> {
        self.remaining
            .get(&(class_id.to_string(), subject_id.to_string()))
            .copied()
    }

    /// Draws `lessons` from a class-subject. On shortage nothing is taken and
    /// the lessons actually left are returned as the error.
    pub fn take(&mut self, class_id: &str, subject_id: &str, lessons: u32) -> Result<(), u32> {
        let slot = self
            .remaining
            .get_mut(&(class_id.to_string(), subject_id.to_string()))
            .ok_or(0u32)?;
        if lessons > *slot {
            return Err(*slot);
        }
        *slot -= lessons;
        Ok(())
    }

    /// The first subject, in the class's own order, that still has lessons
    /// left, together with how many.
    pub fn first_open_subject<'a>(&self, class: &'a Class) -> Option<(&'a Subject, u32)> {
        class.subjects.iter().find_map(|entry| {
            match self.remaining(&class.id, &entry.subject.id) {
                Some(left) if left > 0 => Some((&entry.subject, left)),
                _ => None,
            }
        })
    }
}

/// Remaining lessons of a class-subject when one existing assignment is
/// being replaced.
pub fn remaining_without(entry: &ClassSubject, assignment_id: &str) -> u32 {
    let others: u32 = entry
        .assignments
        .iter()
        .filter(|a| a.assignment_id != assignment_id)
        .map(|a| a.completed_lessons)
        .sum();
    entry.lesson_count.saturating_sub(others)
}
