pub mod admin_handlers;
pub mod auth_handlers;
pub mod content_handlers;
pub mod dashboard;
pub mod student_handlers;

use actix_session::Session;
use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;

use crate::auth;
use crate::auth::session;
use crate::models::outcome::Outcome;

/// Register every route. Used by `main` and by the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/", web::get().to(|| async { crate::errors::redirect("/dashboard") }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/api/dashboard", web::get().to(dashboard::api_stats))
                .route("/search", web::post().to(dashboard::search))
                .route("/report", web::get().to(dashboard::report))
                .route("/leaderboard", web::get().to(dashboard::leaderboard))
                // Students: fixed paths only, identifiers travel in forms and queries
                .route("/students", web::get().to(student_handlers::list))
                .route("/students", web::post().to(student_handlers::create))
                .route("/students/view", web::get().to(student_handlers::view))
                .route("/students/status", web::post().to(student_handlers::update_status))
                .route("/students/notes", web::post().to(student_handlers::update_notes))
                .route("/students/details", web::post().to(student_handlers::update_details))
                .route("/students/flag", web::post().to(student_handlers::toggle_flag))
                .route("/students/documents", web::post().to(student_handlers::update_documents))
                .route("/students/delete", web::post().to(student_handlers::delete))
                .route("/flagged", web::get().to(student_handlers::flagged))
                .route("/lhc_queue", web::get().to(student_handlers::lhc_queue))
                .route("/lhc_queue/mark_done", web::post().to(student_handlers::lhc_mark_done))
                // Content
                .route("/faq", web::get().to(content_handlers::faq))
                .route("/profile", web::get().to(content_handlers::profile_form))
                .route("/profile", web::post().to(content_handlers::profile_submit))
                // Admin: /admin/users/update BEFORE /admin/users/{username}/...
                .route("/admin", web::get().to(admin_handlers::index))
                .route("/admin/users", web::post().to(admin_handlers::create_user))
                .route("/admin/users/update", web::post().to(admin_handlers::update_user))
                .route("/admin/users/{username}/edit", web::get().to(admin_handlers::edit_user))
                .route("/admin/users/{username}/delete", web::post().to(admin_handlers::delete_user))
                .route("/admin/faq", web::get().to(admin_handlers::faq_list))
                .route("/admin/faq", web::post().to(admin_handlers::faq_add))
                .route("/admin/faq/{row}/delete", web::post().to(admin_handlers::faq_delete))
                .route("/admin/faq/{row}", web::post().to(admin_handlers::faq_update))
                .route("/admin/announcement", web::get().to(admin_handlers::announcement_form))
                .route("/admin/announcement", web::post().to(admin_handlers::announcement_save))
                .route("/admin/import", web::get().to(admin_handlers::import_form))
                .route("/admin/import", web::post().to(admin_handlers::import_submit)),
        )
        // Default 404 handler (must be registered last)
        .default_service(web::to(|| async {
            let html = include_str!("../../templates/errors/404.html");
            HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(html)
        }));
}

/// Turn a logic outcome into a flash message for the next page.
pub(crate) fn flash_outcome(session: &Session, outcome: &Outcome, subject: &str, done: &str) {
    match outcome {
        Outcome::Success => session::flash_success(session, format!("{subject} {done}.")),
        Outcome::Duplicate => session::flash_error(session, format!("{subject} already exists.")),
        Outcome::NotFound => session::flash_error(session, format!("{subject} was not found.")),
        Outcome::Invalid(reason) => session::flash_error(session, reason.clone()),
        Outcome::Denied(reason) => {
            log::warn!("Denied: {reason}");
            session::flash_error(session, format!("You do not have permission: {reason}"));
        }
    }
}

/// Detail page URL for a student, with the identifier query-encoded.
pub(crate) fn student_url(identifier: &str) -> String {
    let query = serde_urlencoded::to_string([("search_term", identifier)]).unwrap_or_default();
    format!("/students/view?{query}")
}

/// Wall-clock time used for stage stamps and idle calculations.
pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Only same-site absolute paths are accepted as redirect targets.
pub(crate) fn safe_return_path(candidate: &str) -> Option<&str> {
    (candidate.starts_with('/') && !candidate.starts_with("//")).then_some(candidate)
}
