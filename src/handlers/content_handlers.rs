use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, session};
use crate::context::AppContext;
use crate::errors::{redirect, render, AppError};
use crate::models::outcome::Outcome;
use crate::models::{faq, user};
use crate::templates_structs::{FaqTemplate, PageContext, ProfileTemplate};

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

pub async fn faq(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/faq").await?;
    let tmpl = FaqTemplate { ctx, faqs: faq::find_all(&app.faqs).await };
    render(tmpl)
}

pub async fn profile_form(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &app, "/profile").await?;
    render(ProfileTemplate { ctx, errors: vec![] })
}

pub async fn profile_submit(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<ChangePasswordForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let caller = session::current_caller(&session)?;

    let mut errors: Vec<String> = vec![];
    if form.new_password != form.confirm_password {
        errors.push("New passwords do not match".to_string());
    }
    if user::authenticate(&app.users, &caller.username, &form.current_password).await.is_none() {
        errors.push("Current password is incorrect".to_string());
    }
    if errors.is_empty() {
        match user::change_own_password(&app.users, &caller, &form.new_password).await? {
            Outcome::Success => {
                log::info!("User '{}' changed their password", caller.username);
                session::flash_success(&session, "Password changed successfully.");
                return Ok(redirect("/profile"));
            }
            Outcome::Invalid(reason) => errors.push(reason),
            other => errors.push(format!("Could not change password: {other}")),
        }
    }

    let ctx = PageContext::build(&session, &app, "/profile").await?;
    render(ProfileTemplate { ctx, errors })
}
