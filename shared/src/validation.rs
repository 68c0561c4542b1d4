//! Input normalisation and loose format checks

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose email format check.
///
/// Requires an `@` that is not the first character and a later `.` with at
/// least one character between it and the `@` and at least one after it.
/// Not RFC 5322.
pub fn is_valid_email(email: &str) -> bool {
    let Some(at) = email.find('@') else {
        return false;
    };
    if at == 0 {
        return false;
    }
    let Some(dot) = email.rfind('.') else {
        return false;
    };
    dot >= at + 2 && dot + 1 < email.len()
}
