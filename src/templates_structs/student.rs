use askama::Template;
use chrono::NaiveDateTime;

use crate::handlers::student_url;
use crate::models::student::{
    idle_minutes, DashboardStats, Document, Stage, StageStatus, Student,
};

use super::PageContext;

/// One stage of a student's checklist, flattened for display.
pub struct StageCell {
    pub key: String,
    pub label: String,
    pub status: String,
    pub updated_by: String,
    pub updated_at: String,
    pub is_done: bool,
    pub is_queued: bool,
    pub allows_queue: bool,
}

pub struct DocumentView {
    pub key: String,
    pub label: String,
    pub verified: bool,
}

/// A student as listed in tables and on the detail page.
pub struct StudentRow {
    pub identifier: String,
    pub name: String,
    /// Detail page link.
    pub url: String,
    pub stages: Vec<StageCell>,
    pub documents: Vec<DocumentView>,
    pub notes: String,
    pub flagged: bool,
    pub complete: bool,
    /// "12 min" style idle time, empty when the student has no activity.
    pub idle: String,
}

impl StudentRow {
    pub fn build(student: &Student, now: NaiveDateTime) -> Self {
        let stages = Stage::ALL
            .iter()
            .map(|stage| {
                let record = student.stage(*stage);
                StageCell {
                    key: stage.key().to_string(),
                    label: stage.label().to_string(),
                    status: record.status.as_str().to_string(),
                    updated_by: record.updated_by.clone(),
                    updated_at: record.updated_at.clone(),
                    is_done: record.status == StageStatus::Done,
                    is_queued: record.status == StageStatus::InQueue,
                    allows_queue: stage.allows_queue(),
                }
            })
            .collect();
        let documents = Document::ALL
            .iter()
            .map(|doc| DocumentView {
                key: doc.key().to_string(),
                label: doc.label().to_string(),
                verified: student.is_verified(*doc),
            })
            .collect();
        Self {
            identifier: student.identifier.clone(),
            name: student.name.clone(),
            url: student_url(&student.identifier),
            stages,
            documents,
            notes: student.notes.clone(),
            flagged: student.flagged,
            complete: student.is_complete(),
            idle: idle_minutes(student, now)
                .map(|m| format!("{m} min"))
                .unwrap_or_default(),
        }
    }

    pub fn build_all<'a>(students: impl IntoIterator<Item = &'a Student>, now: NaiveDateTime) -> Vec<Self> {
        students.into_iter().map(|s| Self::build(s, now)).collect()
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub stats: DashboardStats,
    pub new_faq: bool,
    pub stuck: Vec<StudentRow>,
    pub threshold_minutes: i64,
}

#[derive(Template)]
#[template(path = "students/list.html")]
pub struct StudentListTemplate {
    pub ctx: PageContext,
    pub students: Vec<StudentRow>,
}

#[derive(Template)]
#[template(path = "students/detail.html")]
pub struct StudentDetailTemplate {
    pub ctx: PageContext,
    pub student: StudentRow,
}

#[derive(Template)]
#[template(path = "flagged.html")]
pub struct FlaggedTemplate {
    pub ctx: PageContext,
    pub flagged: Vec<StudentRow>,
    pub stuck: Vec<StudentRow>,
    pub threshold_minutes: i64,
}

#[derive(Template)]
#[template(path = "lhc_queue.html")]
pub struct LhcQueueTemplate {
    pub ctx: PageContext,
    pub students: Vec<StudentRow>,
}
