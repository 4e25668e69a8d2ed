use std::collections::HashMap;
use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;

use super::stuck::is_stuck;
use super::types::{Stage, StageStatus, Student};

/// Headline numbers for the live dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub at_hostel: usize,
    pub in_lhc_queue: usize,
    pub flagged: usize,
    pub stuck: usize,
}

impl DashboardStats {
    pub fn collect(students: &[Student], threshold: TimeDelta, now: NaiveDateTime) -> Self {
        let count = |pred: &dyn Fn(&Student) -> bool| students.iter().filter(|s| pred(s)).count();
        DashboardStats {
            total: students.len(),
            completed: count(&|s| s.is_complete()),
            at_hostel: count(&|s| s.status(Stage::Hostel) == StageStatus::Pending),
            in_lhc_queue: count(&|s| s.status(Stage::LhcDocs) == StageStatus::InQueue),
            flagged: count(&|s| s.flagged),
            stuck: count(&|s| is_stuck(s, threshold, now)),
        }
    }
}

/// Students waiting at the LHC document desk, in sheet order.
pub fn lhc_queue(students: &[Student]) -> Vec<&Student> {
    students
        .iter()
        .filter(|s| s.status(Stage::LhcDocs) == StageStatus::InQueue)
        .collect()
}

pub fn flagged(students: &[Student]) -> Vec<&Student> {
    students.iter().filter(|s| s.flagged).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub volunteer: String,
    pub stamps: usize,
}

/// Stage cells stamped per volunteer, busiest first, ties by name.
pub fn leaderboard(students: &[Student]) -> Vec<LeaderboardEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stage in students.iter().flat_map(|s| s.stages.iter()) {
        let by = stage.updated_by.trim();
        if !by.is_empty() {
            *counts.entry(by).or_default() += 1;
        }
    }
    let mut board: Vec<LeaderboardEntry> = counts
        .into_iter()
        .map(|(volunteer, stamps)| LeaderboardEntry { volunteer: volunteer.to_string(), stamps })
        .collect();
    board.sort_by(|a, b| b.stamps.cmp(&a.stamps).then_with(|| a.volunteer.cmp(&b.volunteer)));
    board
}

/// Plain-text end-of-day summary.
pub fn end_of_day_report(event_name: &str, students: &[Student], date: NaiveDate) -> String {
    let completed = students.iter().filter(|s| s.is_complete()).count();
    let flagged = students.iter().filter(|s| s.flagged).count();
    let title = format!("{event_name} - End of Day Report: {}", date.format("%Y-%m-%d"));

    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Summary:");
    let _ = writeln!(out, "  - Total Students in System: {}", students.len());
    let _ = writeln!(out, "  - Students Fully Registered: {completed}");
    let _ = writeln!(out, "  - Students Flagged for Assistance: {flagged}");

    let noted: Vec<&Student> = students.iter().filter(|s| !s.notes.trim().is_empty()).collect();
    if !noted.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Students with Special Notes:");
        for s in noted {
            let _ = writeln!(out, "  - {} (ID: {}): {}", s.name, s.identifier, s.notes.trim());
        }
    }
    out
}
