use actix_session::Session;
use actix_web::{web, HttpResponse};

use crate::auth::{csrf, session};
use crate::context::AppContext;
use crate::errors::{redirect, render, AppError};
use crate::models::student::{self, DashboardStats, SearchForm};
use crate::templates_structs::{DashboardTemplate, LeaderboardTemplate, PageContext, StudentRow};

use super::{now, student_url};

pub async fn index(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/dashboard").await?;
    let new_faq = session::take_new_faq(&session);

    let at = now();
    let students = student::list_all(&app.students).await;
    let stats = DashboardStats::collect(&students, app.stuck_threshold, at);
    let stuck = StudentRow::build_all(student::detect_stuck(&students, app.stuck_threshold, at), at);

    let tmpl = DashboardTemplate {
        ctx,
        stats,
        new_faq,
        stuck,
        threshold_minutes: app.stuck_threshold.num_minutes(),
    };
    render(tmpl)
}

/// Dashboard numbers as JSON, polled by the dashboard page.
pub async fn api_stats(app: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let students = student::list_all(&app.students).await;
    let stats = DashboardStats::collect(&students, app.stuck_threshold, now());
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn search(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<SearchForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let term = form.search_term.trim();
    if term.is_empty() {
        session::flash_error(&session, "Enter an application ID or a full name.");
        return Ok(redirect("/dashboard"));
    }
    match student::find(&app.students, term).await? {
        Some(found) => Ok(redirect(&student_url(&found.identifier))),
        None => {
            session::flash_error(&session, format!("No student found for '{term}'."));
            Ok(redirect("/dashboard"))
        }
    }
}

/// End-of-day summary as a plain-text download.
pub async fn report(app: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let students = student::list_all(&app.students).await;
    let today = now().date();
    let body = student::end_of_day_report(&app.event_name, &students, today);
    let filename = format!("udaan_report_{}.txt", today.format("%Y-%m-%d"));
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(("Content-Disposition", format!("attachment; filename=\"{filename}\"")))
        .body(body))
}

pub async fn leaderboard(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/leaderboard").await?;
    let students = student::list_all(&app.students).await;
    let tmpl = LeaderboardTemplate { ctx, entries: student::leaderboard(&students) };
    render(tmpl)
}
