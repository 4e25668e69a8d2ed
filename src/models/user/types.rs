use serde::{Deserialize, Serialize};

/// Username of the primary administrator. It can never be deleted and only
/// that account itself may edit it.
pub const PRIMARY_ADMIN: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Volunteer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Volunteer => "volunteer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Volunteer => "Volunteer",
        }
    }

    /// Parse a stored role cell. Anything that is not `admin` is a volunteer.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Volunteer
        }
    }
}

/// A row of the Volunteers worksheet. The password is stored as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub row: usize,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// The authenticated user on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn new(username: &str, role: Role) -> Self {
        Self { username: normalize_username(username), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Name stamped into stage cells: first letter upper-case, rest lower-case.
    pub fn display_name(&self) -> String {
        let mut chars = self.username.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// Usernames are compared trimmed and lower-cased everywhere.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Form data from the admin create/edit user forms.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub original_username: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub csrf_token: String,
}

fn default_role() -> String {
    Role::Volunteer.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_capitalizes_first_letter_only() {
        assert_eq!(Caller::new("RAJ", Role::Volunteer).display_name(), "Raj");
        assert_eq!(Caller::new(" priya ", Role::Admin).display_name(), "Priya");
        assert_eq!(Caller::new("", Role::Volunteer).display_name(), "");
    }

    #[test]
    fn unknown_roles_fall_back_to_volunteer() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("volunteer"), Role::Volunteer);
        assert_eq!(Role::parse("superuser"), Role::Volunteer);
    }
}
