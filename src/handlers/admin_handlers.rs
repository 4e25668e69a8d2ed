use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, session};
use crate::context::AppContext;
use crate::errors::{redirect, render, AppError};
use crate::models::announcement::{self, AnnouncementForm};
use crate::models::faq::{self, FaqForm};
use crate::models::student;
use crate::models::user::{self, normalize_username, Caller, Role, UserForm};
use crate::templates_structs::{
    AdminFaqTemplate, AdminTemplate, AnnouncementTemplate, ImportTemplate, PageContext,
    UserEditTemplate, UserView,
};

use super::auth_handlers::CsrfOnly;
use super::flash_outcome;

#[derive(Deserialize)]
pub struct ImportForm {
    #[serde(default)]
    pub roster: String,
    pub csrf_token: String,
}

/// Gate for admin-only pages. Mutations are checked again by the logic layer.
fn require_admin(session: &Session) -> Result<Caller, AppError> {
    let caller = session::current_caller(session)?;
    if !caller.is_admin() {
        log::warn!("'{}' tried to open an admin page", caller.username);
        return Err(AppError::PermissionDenied("administrator access required".to_string()));
    }
    Ok(caller)
}

// --- Users ---

pub async fn index(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session, &app, "/admin").await?;
    let users = user::find_all(&app.users).await;
    let tmpl = AdminTemplate { ctx, users: users.iter().map(UserView::from).collect() };
    render(tmpl)
}

pub async fn create_user(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = user::create(
        &app.users,
        &caller,
        &form.username,
        &form.password,
        Role::parse(&form.role),
    )
    .await?;
    let subject = format!("User '{}'", normalize_username(&form.username));
    flash_outcome(&session, &outcome, &subject, "created");
    Ok(redirect("/admin"))
}

pub async fn edit_user(
    app: web::Data<AppContext>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let found = user::find_by_username(&app.users, &path.into_inner())
        .await
        .ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, &app, "/admin").await?;
    let tmpl = UserEditTemplate { ctx, user: UserView::from(&found) };
    render(tmpl)
}

pub async fn update_user(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = user::update(
        &app.users,
        &caller,
        &form.original_username,
        &form.username,
        &form.password,
        Role::parse(&form.role),
    )
    .await?;
    let subject = format!("User '{}'", normalize_username(&form.username));
    flash_outcome(&session, &outcome, &subject, "updated");
    Ok(redirect("/admin"))
}

pub async fn delete_user(
    app: web::Data<AppContext>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;
    let username = path.into_inner();

    let outcome = user::delete(&app.users, &caller, &username).await?;
    let subject = format!("User '{}'", normalize_username(&username));
    flash_outcome(&session, &outcome, &subject, "deleted");
    Ok(redirect("/admin"))
}

// --- FAQ ---

pub async fn faq_list(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session, &app, "/admin/faq").await?;
    let tmpl = AdminFaqTemplate { ctx, faqs: faq::find_all(&app.faqs).await };
    render(tmpl)
}

pub async fn faq_add(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<FaqForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = faq::add(&app.faqs, &caller, &form.question, &form.answer).await?;
    flash_outcome(&session, &outcome, "FAQ", "added");
    if outcome.is_success() {
        session::mark_new_faq(&session);
    }
    Ok(redirect("/admin/faq"))
}

pub async fn faq_update(
    app: web::Data<AppContext>,
    session: Session,
    path: web::Path<usize>,
    form: web::Form<FaqForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = faq::update(&app.faqs, &caller, path.into_inner(), &form.question, &form.answer).await?;
    flash_outcome(&session, &outcome, "FAQ", "updated");
    Ok(redirect("/admin/faq"))
}

pub async fn faq_delete(
    app: web::Data<AppContext>,
    session: Session,
    path: web::Path<usize>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = faq::delete(&app.faqs, &caller, path.into_inner()).await?;
    flash_outcome(&session, &outcome, "FAQ", "deleted");
    Ok(redirect("/admin/faq"))
}

// --- Announcement ---

pub async fn announcement_form(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session, &app, "/admin/announcement").await?;
    let message = ctx.announcement.clone();
    render(AnnouncementTemplate { ctx, message })
}

pub async fn announcement_save(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<AnnouncementForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let outcome = announcement::set(&app.announcements, &caller, &form.message).await?;
    let done = if form.message.trim().is_empty() { "cleared" } else { "posted" };
    flash_outcome(&session, &outcome, "Announcement", done);
    Ok(redirect("/admin/announcement"))
}

// --- Bulk import ---

pub async fn import_form(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session)?;
    let ctx = PageContext::build(&session, &app, "/admin/import").await?;
    render(ImportTemplate { ctx, summary: None })
}

/// Pasted roster in `application_id,student_name` lines. The summary is
/// rendered in place so skipped duplicates stay visible.
pub async fn import_submit(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<ImportForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let (outcome, summary) = student::bulk_import(&app.students, &caller, &form.roster).await?;
    let subject = format!("{} student(s)", summary.added);
    flash_outcome(&session, &outcome, &subject, "imported");

    let ctx = PageContext::build(&session, &app, "/admin/import").await?;
    render(ImportTemplate { ctx, summary: Some(summary) })
}
