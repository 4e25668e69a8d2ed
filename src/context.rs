use std::sync::Arc;

use chrono::TimeDelta;

use crate::config::AppConfig;
use crate::models::user;
use crate::store::schema::{
    self, SchemaError, ANNOUNCEMENTS_SHEET, ANNOUNCEMENT_HEADERS, FAQ_HEADERS, FAQ_SHEET,
    STUDENTS_SHEET, STUDENT_HEADERS, VOLUNTEERS_SHEET, VOLUNTEER_HEADERS,
};
use crate::store::{RowStore, StoreError, Worksheet};

/// Live handles to every worksheet plus the settings handlers need.
/// Built once at startup and shared with handlers through `web::Data`.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub students: Worksheet,
    pub users: Worksheet,
    pub faqs: Worksheet,
    pub announcements: Worksheet,
    pub stuck_threshold: TimeDelta,
    pub event_name: String,
}

impl AppContext {
    /// Open all worksheets and verify their header rows.
    pub async fn connect(store: Arc<dyn RowStore>, config: &AppConfig) -> Result<Self, SchemaError> {
        let ctx = AppContext {
            students: Worksheet::open(store.clone(), STUDENTS_SHEET).await?,
            users: Worksheet::open(store.clone(), VOLUNTEERS_SHEET).await?,
            faqs: Worksheet::open(store.clone(), FAQ_SHEET).await?,
            announcements: Worksheet::open(store, ANNOUNCEMENTS_SHEET).await?,
            stuck_threshold: config.stuck_threshold(),
            event_name: config.event_name.clone(),
        };
        schema::verify_headers(&ctx.students, &STUDENT_HEADERS).await?;
        schema::verify_headers(&ctx.users, &VOLUNTEER_HEADERS).await?;
        schema::verify_headers(&ctx.faqs, &FAQ_HEADERS).await?;
        schema::verify_headers(&ctx.announcements, &ANNOUNCEMENT_HEADERS).await?;
        Ok(ctx)
    }
}

/// Create any missing worksheet with its header row and seed the primary admin.
pub async fn provision(store: Arc<dyn RowStore>, admin_password: &str) -> Result<(), StoreError> {
    for (title, headers) in schema::WORKSHEETS {
        if !store.has_worksheet(title).await? {
            store.create_worksheet(title, headers).await?;
            log::info!("Created worksheet '{title}'");
        }
    }
    let users = Worksheet::open(store, VOLUNTEERS_SHEET).await?;
    user::ensure_primary_admin(&users, admin_password).await?;
    Ok(())
}
