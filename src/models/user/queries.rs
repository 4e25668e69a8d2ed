use crate::models::outcome::Outcome;
use crate::store::{Record, StoreError, Worksheet};

use super::types::{normalize_username, Caller, Role, User, PRIMARY_ADMIN};

const USERNAME_COL: usize = 1;
const PASSWORD_COL: usize = 2;
const ROLE_COL: usize = 3;

fn user_row(username: &str, password: &str, role: Role) -> Vec<String> {
    vec![username.to_string(), password.to_string(), role.as_str().to_string()]
}

/// Row number of a username. Stored names are normalized before comparing, so
/// a hand-typed `Raj` resolves the same way it does at login.
/// Store failures are logged and reported as not found.
pub async fn locate(sheet: &Worksheet, username: &str) -> Option<usize> {
    let username = normalize_username(username);
    if username.is_empty() {
        return None;
    }
    find_by_username(sheet, &username).await.map(|u| u.row)
}

fn user_from_record(row: usize, r: &Record) -> User {
    User {
        row,
        username: normalize_username(r.get("username").map(String::as_str).unwrap_or("")),
        password: r.get("password").cloned().unwrap_or_default(),
        role: Role::parse(r.get("role").map(String::as_str).unwrap_or("")),
    }
}

/// All users in sheet order, propagating store failures.
pub async fn load_all(sheet: &Worksheet) -> Result<Vec<User>, StoreError> {
    let records = sheet.records().await?;
    Ok(records.iter().map(|(row, r)| user_from_record(*row, r)).collect())
}

/// All users in sheet order. Returns an empty list if the store cannot be read.
pub async fn find_all(sheet: &Worksheet) -> Vec<User> {
    match load_all(sheet).await {
        Ok(users) => users,
        Err(e) => {
            log::warn!("Could not load users from '{}': {e}", sheet.title());
            Vec::new()
        }
    }
}

pub async fn find_by_username(sheet: &Worksheet, username: &str) -> Option<User> {
    let username = normalize_username(username);
    find_all(sheet).await.into_iter().find(|u| u.username == username)
}

/// Check credentials against the Volunteers worksheet. The password is an
/// exact string comparison against the stored plain-text value.
pub async fn authenticate(sheet: &Worksheet, username: &str, password: &str) -> Option<User> {
    let username = normalize_username(username);
    find_all(sheet)
        .await
        .into_iter()
        .find(|u| u.username == username && u.password == password)
}

pub async fn create(
    sheet: &Worksheet,
    caller: &Caller,
    username: &str,
    password: &str,
    role: Role,
) -> Result<Outcome, StoreError> {
    if !caller.is_admin() {
        return Ok(Outcome::denied("Only administrators can add users"));
    }
    let username = normalize_username(username);
    if username.is_empty() || password.is_empty() {
        return Ok(Outcome::invalid("Username and password are required"));
    }
    if locate(sheet, &username).await.is_some() {
        return Ok(Outcome::Duplicate);
    }
    sheet.append_row(&user_row(&username, password, role)).await?;
    log::info!("User '{username}' ({}) created by '{}'", role.as_str(), caller.username);
    Ok(Outcome::Success)
}

/// Edit username, password and role of an existing user.
/// An empty `new_password` keeps the stored password.
pub async fn update(
    sheet: &Worksheet,
    caller: &Caller,
    original: &str,
    new_username: &str,
    new_password: &str,
    new_role: Role,
) -> Result<Outcome, StoreError> {
    if !caller.is_admin() {
        return Ok(Outcome::denied("Only administrators can edit users"));
    }
    let original = normalize_username(original);
    let new_username = normalize_username(new_username);

    if original == PRIMARY_ADMIN {
        if caller.username != PRIMARY_ADMIN {
            return Ok(Outcome::denied("Only the primary admin can edit the primary admin account"));
        }
        if new_username != PRIMARY_ADMIN || new_role != Role::Admin {
            return Ok(Outcome::invalid("The primary admin must keep its username and admin role"));
        }
    }
    if new_username.is_empty() {
        return Ok(Outcome::invalid("Username is required"));
    }
    if new_username != original && locate(sheet, &new_username).await.is_some() {
        return Ok(Outcome::Duplicate);
    }
    let Some(row) = locate(sheet, &original).await else {
        return Ok(Outcome::NotFound);
    };

    let mut cells = vec![
        (USERNAME_COL, new_username.clone()),
        (ROLE_COL, new_role.as_str().to_string()),
    ];
    if !new_password.is_empty() {
        cells.push((PASSWORD_COL, new_password.to_string()));
    }
    sheet.update_cells(row, &cells).await?;
    log::info!("User '{original}' updated to '{new_username}' by '{}'", caller.username);
    Ok(Outcome::Success)
}

/// Self-service password change for the logged-in user.
pub async fn change_own_password(
    sheet: &Worksheet,
    caller: &Caller,
    new_password: &str,
) -> Result<Outcome, StoreError> {
    if new_password.is_empty() {
        return Ok(Outcome::invalid("Password cannot be empty"));
    }
    let Some(row) = locate(sheet, &caller.username).await else {
        return Ok(Outcome::NotFound);
    };
    sheet.update_cell(row, PASSWORD_COL, new_password).await?;
    Ok(Outcome::Success)
}

pub async fn delete(sheet: &Worksheet, caller: &Caller, username: &str) -> Result<Outcome, StoreError> {
    let username = normalize_username(username);
    if username == PRIMARY_ADMIN {
        return Ok(Outcome::denied("The primary admin account cannot be deleted"));
    }
    if !caller.is_admin() {
        return Ok(Outcome::denied("Only administrators can delete users"));
    }
    let Some(row) = locate(sheet, &username).await else {
        return Ok(Outcome::NotFound);
    };
    sheet.delete_row(row).await?;
    log::info!("User '{username}' deleted by '{}'", caller.username);
    Ok(Outcome::Success)
}

/// Make sure the primary admin exists; used when provisioning a fresh workbook.
pub async fn ensure_primary_admin(sheet: &Worksheet, password: &str) -> Result<bool, StoreError> {
    if locate(sheet, PRIMARY_ADMIN).await.is_some() {
        return Ok(false);
    }
    sheet.append_row(&user_row(PRIMARY_ADMIN, password, Role::Admin)).await?;
    log::info!("Seeded primary admin account");
    Ok(true)
}
