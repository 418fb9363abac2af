//! Single-password admin authorization.
//!
//! Admin requests present the configured password as a bearer token. There
//! are no sessions; the admin UI keeps the password client-side.

pub mod handlers;
pub mod middleware;

use constant_time_eq::constant_time_eq;

/// Compares in constant time. An unset or empty password matches nothing.
pub fn password_matches(expected: Option<&str>, presented: &str) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            constant_time_eq(expected.as_bytes(), presented.as_bytes())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_configured_password() {
        assert!(password_matches(Some("atelier"), "atelier"));
        assert!(!password_matches(Some("atelier"), "Atelier"));
        assert!(!password_matches(Some("atelier"), "atelier "));
        assert!(!password_matches(Some("atelier"), ""));
    }

    #[test]
    fn unset_password_rejects_everything() {
        assert!(!password_matches(None, ""));
        assert!(!password_matches(None, "anything"));
        assert!(!password_matches(Some(""), ""));
    }
}
