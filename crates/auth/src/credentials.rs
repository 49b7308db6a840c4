//! Login form schema.

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Credentials that passed the login schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Check raw login fields against the schema: a syntactically valid email
/// and a password of at least [`MIN_PASSWORD_LEN`] characters.
///
/// Returns `None` when either field is missing or malformed; callers treat
/// that exactly like a wrong password.
pub fn parse_credentials(email: Option<&str>, password: Option<&str>) -> Option<Credentials> {
    let email = email?.trim();
    let password = password?;

    if !is_valid_email(email) || password.chars().count() < MIN_PASSWORD_LEN {
        return None;
    }

    Some(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_credentials() {
        let c = parse_credentials(Some(" user@nextmail.com "), Some("123456")).unwrap();
        assert_eq!(c.email, "user@nextmail.com");
        assert_eq!(c.password, "123456");
    }

    #[test]
    fn rejects_short_passwords() {
        assert!(parse_credentials(Some("user@nextmail.com"), Some("12345")).is_none());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(parse_credentials(None, Some("123456")).is_none());
        assert!(parse_credentials(Some("user@nextmail.com"), None).is_none());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "user", "@nextmail.com", "user@", "user@nextmail", "user@@x.com", "a b@x.com", "user@x..com"] {
            assert!(parse_credentials(Some(email), Some("123456")).is_none(), "{email}");
        }
    }
}
