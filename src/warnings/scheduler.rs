use std::time::Duration;

use crate::context::AppContext;

/// Run the stuck-student scan every `interval_secs`. Zero disables it.
pub fn spawn_scheduler(app: AppContext, interval_secs: u64) {
    if interval_secs == 0 {
        log::info!("Stuck scan disabled");
        return;
    }
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            log::info!("Running stuck scan");
            let now = chrono::Local::now().naive_local();
            super::report_stuck(&app, now).await;
        }
    });
}
