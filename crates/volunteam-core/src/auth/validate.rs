//! Input checks run before any network call.

/// Shortest password accepted by the login form
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Characters allowed in the local part besides ASCII alphanumerics
const LOCAL_PART_SYMBOLS: &str = ".!#$%&'*+/=?^_`{|}~-";

/// Trim and lowercase an email as typed.
pub fn sanitize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Conservative email shape check on the trimmed input.
///
/// Requires exactly one `@`, a non-empty local part and a domain of at least
/// two non-empty dot-separated labels. Consecutive dots, a leading or
/// trailing dot and inner whitespace are rejected.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    if local.is_empty() || domain.contains('@') || email.contains("..") {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SYMBOLS.contains(c));
    if !local_ok || local.starts_with('.') || local.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}
