use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, session};
use crate::context::AppContext;
use crate::errors::{redirect, render, AppError};
use crate::models::user;
use crate::templates_structs::LoginTemplate;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_template(app: &AppContext, session: &Session, error: Option<String>) -> LoginTemplate {
    LoginTemplate {
        error,
        event_name: app.event_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
    }
}

pub async fn login_page(
    app: web::Data<AppContext>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    // If already logged in, redirect to dashboard
    if session::is_logged_in(&session) {
        return Ok(redirect("/dashboard"));
    }
    render(login_template(&app, &session, None))
}

pub async fn login_submit(
    app: web::Data<AppContext>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    match user::authenticate(&app.users, &form.username, &form.password).await {
        Some(u) => {
            log::info!("User '{}' logged in", u.username);
            session::login(&session, &u);
            Ok(redirect("/dashboard"))
        }
        None => {
            log::warn!("Failed login for '{}'", user::normalize_username(&form.username));
            let tmpl = login_template(&app, &session, Some("Invalid username or password".to_string()));
            render(tmpl)
        }
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect("/login"))
}
