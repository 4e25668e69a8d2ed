use askama::Template;

use crate::models::faq::Faq;
use crate::models::student::LeaderboardEntry;

use super::PageContext;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub event_name: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "faq.html")]
pub struct FaqTemplate {
    pub ctx: PageContext,
    pub faqs: Vec<Faq>,
}

#[derive(Template)]
#[template(path = "leaderboard.html")]
pub struct LeaderboardTemplate {
    pub ctx: PageContext,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
}
