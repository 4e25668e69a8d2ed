use askama::Template;

use crate::models::faq::Faq;
use crate::models::student::import::ImportSummary;
use crate::models::user::{Role, User, PRIMARY_ADMIN};

use super::PageContext;

/// A user row as shown in the admin screens. Passwords are never rendered.
pub struct UserView {
    pub username: String,
    pub role: String,
    pub role_label: String,
    pub is_admin: bool,
    pub is_primary: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            role_label: user.role.label().to_string(),
            is_admin: user.role == Role::Admin,
            is_primary: user.username == PRIMARY_ADMIN,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserView>,
}

#[derive(Template)]
#[template(path = "admin/user_form.html")]
pub struct UserEditTemplate {
    pub ctx: PageContext,
    pub user: UserView,
}

#[derive(Template)]
#[template(path = "admin/faq.html")]
pub struct AdminFaqTemplate {
    pub ctx: PageContext,
    pub faqs: Vec<Faq>,
}

#[derive(Template)]
#[template(path = "admin/announcement.html")]
pub struct AnnouncementTemplate {
    pub ctx: PageContext,
    pub message: String,
}

#[derive(Template)]
#[template(path = "admin/import.html")]
pub struct ImportTemplate {
    pub ctx: PageContext,
    pub summary: Option<ImportSummary>,
}
