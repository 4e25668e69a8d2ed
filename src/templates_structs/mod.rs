// Template context structures for Askama templates, organized by page area.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{self, Flash};
use crate::context::AppContext;
use crate::errors::AppError;
use crate::models::announcement;

mod admin;
mod common;
mod student;

pub use self::admin::{
    AdminTemplate, AdminFaqTemplate, AnnouncementTemplate, ImportTemplate, UserEditTemplate,
    UserView,
};
pub use self::common::{FaqTemplate, LeaderboardTemplate, LoginTemplate, ProfileTemplate};
pub use self::student::{
    DashboardTemplate, DocumentView, FlaggedTemplate, LhcQueueTemplate, StageCell,
    StudentDetailTemplate, StudentListTemplate, StudentRow,
};

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub username: String,
    pub role_label: String,
    pub is_admin: bool,
    pub flash: Option<Flash>,
    pub announcement: String,
    pub csrf_token: String,
    pub event_name: String,
    pub current_path: String,
}

impl PageContext {
    pub async fn build(session: &Session, app: &AppContext, current_path: &str) -> Result<Self, AppError> {
        let caller = session::current_caller(session)?;
        let flash = session::take_flash(session);
        let announcement = announcement::get(&app.announcements).await;
        let csrf_token = csrf::get_or_create_token(session);
        Ok(Self {
            username: caller.display_name(),
            role_label: caller.role.label().to_string(),
            is_admin: caller.is_admin(),
            flash,
            announcement,
            csrf_token,
            event_name: app.event_name.clone(),
            current_path: current_path.to_string(),
        })
    }

    /// Whether a nav link should be highlighted.
    pub fn is_active(&self, prefix: &str) -> bool {
        self.current_path == prefix || self.current_path.starts_with(&format!("{prefix}/"))
    }
}
