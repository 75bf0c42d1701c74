//! Small shared helpers.
//!
//! The naming fallbacks live here as explicit policy functions rather than
//! inline defaults scattered through the handlers.

/// Accounts registered without a username use their email as the username.
pub fn username_or_email(username: Option<&str>, email: &str) -> String {
    match username.map(str::trim).filter(|u| !u.is_empty()) {
        Some(username) => username.to_string(),
        None => email.to_string(),
    }
}

/// Human-readable name: "First Last" when either part exists, otherwise the
/// username.
pub fn display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let full = format!("{first_name} {last_name}");
    let full = full.trim();
    if full.is_empty() {
        username.to_string()
    } else {
        full.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_falls_back_to_email() {
        assert_eq!(username_or_email(None, "a@b.edu"), "a@b.edu");
        assert_eq!(username_or_email(Some("  "), "a@b.edu"), "a@b.edu");
        assert_eq!(username_or_email(Some("ada"), "a@b.edu"), "ada");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(display_name("Ada", "Lovelace", "ada"), "Ada Lovelace");
        assert_eq!(display_name("Ada", "", "ada"), "Ada");
        assert_eq!(display_name("", "", "ada"), "ada");
    }
}
