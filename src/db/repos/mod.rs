mod bookings;
mod invoices;
mod jobs;
mod large_projects;
mod organizations;
mod packing_jobs;
mod profiles;
mod projects;
mod user_roles;

pub use bookings::*;
pub use invoices::*;
pub use jobs::*;
pub use large_projects::*;
pub use organizations::*;
pub use packing_jobs::*;
pub use profiles::*;
pub use projects::*;
pub use user_roles::*;

/// Escape `%`, `_` and `\` so user input matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lower-cased `%needle%` pattern for case-insensitive substring matching.
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(&needle.trim().to_lowercase()))
}

/// Case-insensitive substring test with full Unicode folding, the in-process
/// counterpart of `ILIKE '%needle%'`.
pub fn name_contains(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("  Sommar Festival "), "%sommar festival%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
    }

    #[test]
    fn test_name_contains_folds_unicode() {
        assert!(name_contains("Årsmöte Stockholm", "årsmöte"));
        assert!(name_contains("årsmöte stockholm", " ÅRSMÖTE "));
        assert!(name_contains("Rabatt 50% mässa", "50%"));
        assert!(!name_contains("Mässa", "_"));
    }
}
