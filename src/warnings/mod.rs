pub mod scheduler;

use chrono::NaiveDateTime;

use crate::context::AppContext;
use crate::models::student::{self, idle_minutes};

/// A student idle past the stuck threshold, as reported by the periodic scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckWarning {
    pub identifier: String,
    pub name: String,
    pub idle_minutes: i64,
}

/// Reload every student and collect the stuck ones.
pub async fn scan_stuck(app: &AppContext, now: NaiveDateTime) -> Vec<StuckWarning> {
    let students = student::list_all(&app.students).await;
    student::detect_stuck(&students, app.stuck_threshold, now)
        .into_iter()
        .map(|s| StuckWarning {
            identifier: s.identifier.clone(),
            name: s.name.clone(),
            idle_minutes: idle_minutes(s, now).unwrap_or_default(),
        })
        .collect()
}

/// Log one line per stuck student. Returns how many were found.
pub async fn report_stuck(app: &AppContext, now: NaiveDateTime) -> usize {
    let stuck = scan_stuck(app, now).await;
    if stuck.is_empty() {
        log::info!("Stuck scan: no students idle past {} min", app.stuck_threshold.num_minutes());
    }
    for w in &stuck {
        log::warn!(
            "Stuck student: {} ({}) idle for {} min",
            w.name, w.identifier, w.idle_minutes
        );
    }
    stuck.len()
}
