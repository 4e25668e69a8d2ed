use actix_session::Session;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::{Caller, Role, User};

const USERNAME_KEY: &str = "username";
const ROLE_KEY: &str = "role";
const FLASH_KEY: &str = "flash";
const NEW_FAQ_KEY: &str = "new_faq_added";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

pub fn login(session: &Session, user: &User) {
    session.renew();
    let _ = session.insert(USERNAME_KEY, &user.username);
    let _ = session.insert(ROLE_KEY, user.role);
}

pub fn is_logged_in(session: &Session) -> bool {
    session.get::<String>(USERNAME_KEY).unwrap_or(None).is_some()
}

pub fn username(session: &Session) -> Option<String> {
    session.get::<String>(USERNAME_KEY).unwrap_or(None)
}

/// Overwrite the role recorded at login with the one currently on file.
pub fn sync_role(session: &Session, role: Role) {
    if session.get::<Role>(ROLE_KEY).unwrap_or(None) != Some(role) {
        let _ = session.insert(ROLE_KEY, role);
    }
}

/// The logged-in user. The role is kept current by `require_auth`.
pub fn current_caller(session: &Session) -> Result<Caller, AppError> {
    let username = session
        .get::<String>(USERNAME_KEY)
        .map_err(|e| AppError::Session(format!("Session error: {e}")))?
        .ok_or_else(|| AppError::Session("Not logged in".to_string()))?;
    let role = session
        .get::<Role>(ROLE_KEY)
        .unwrap_or(None)
        .unwrap_or(Role::Volunteer);
    Ok(Caller::new(&username, role))
}

pub fn flash_success(session: &Session, message: impl Into<String>) {
    set_flash(session, "success", message.into());
}

pub fn flash_error(session: &Session, message: impl Into<String>) {
    set_flash(session, "error", message.into());
}

fn set_flash(session: &Session, level: &str, message: String) {
    let _ = session.insert(FLASH_KEY, Flash { level: level.to_string(), message });
}

pub fn take_flash(session: &Session) -> Option<Flash> {
    let flash = session.get::<Flash>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}

/// Raise the one-shot "new FAQ" notice for this session.
pub fn mark_new_faq(session: &Session) {
    let _ = session.insert(NEW_FAQ_KEY, true);
}

pub fn take_new_faq(session: &Session) -> bool {
    session.remove_as::<bool>(NEW_FAQ_KEY).and_then(Result::ok).unwrap_or(false)
}
