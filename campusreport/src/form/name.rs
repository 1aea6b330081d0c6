//! Submitter name normalization

use regex::Regex;
use std::sync::OnceLock;

static NAME_FORMAT: OnceLock<Regex> = OnceLock::new();

/// Trim and title-case a name: the first letter of every run of letters is
/// upper case, the rest lower case.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Letters, spaces and hyphens only
pub fn is_well_formed(name: &str) -> bool {
    NAME_FORMAT
        .get_or_init(|| Regex::new(r"^[A-Za-z\- ]+$").unwrap())
        .is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  john DOE "), "John Doe");
        assert_eq!(normalize("mary-jane o'neil"), "Mary-Jane O'Neil");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_format() {
        assert!(is_well_formed("Mary-Jane Doe"));
        assert!(!is_well_formed("J0hn"));
        assert!(!is_well_formed("O'Neil"));
        assert!(!is_well_formed("Ama."));
        assert!(!is_well_formed(""));
    }
}
