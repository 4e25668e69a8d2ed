use chrono::{NaiveDateTime, TimeDelta};

use super::types::Student;

/// Default idle time after which an unfinished student counts as stuck.
pub const DEFAULT_STUCK_MINUTES: i64 = 45;

/// Whether a student has been idle for strictly longer than `threshold`.
///
/// Completed students are never stuck. Neither is a student with no stage
/// activity at all: no timestamp means nothing to measure from.
pub fn is_stuck(student: &Student, threshold: TimeDelta, now: NaiveDateTime) -> bool {
    if student.is_complete() {
        return false;
    }
    match student.last_activity() {
        Some(last) => now - last > threshold,
        None => false,
    }
}

pub fn detect_stuck(students: &[Student], threshold: TimeDelta, now: NaiveDateTime) -> Vec<&Student> {
    students
        .iter()
        .filter(|s| is_stuck(s, threshold, now))
        .collect()
}

/// Minutes since the last stage activity, for display.
pub fn idle_minutes(student: &Student, now: NaiveDateTime) -> Option<i64> {
    student.last_activity().map(|last| (now - last).num_minutes())
}
