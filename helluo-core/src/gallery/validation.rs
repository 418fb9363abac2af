use url::Url;

use crate::{GalleryError, Result};

/// Trimmed `value`, provided its length in characters is within bounds.
pub(crate) fn bounded(field: &str, value: &str, min: usize, max: usize) -> Result<String> {
    let value = value.trim();
    let len = value.chars().count();
    if len < min {
        return Err(GalleryError::validation(format!("{field} is required")));
    }
    if len > max {
        return Err(GalleryError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

pub(crate) fn absolute_url(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    Url::parse(value)
        .map(|_| value.to_string())
        .map_err(|_| GalleryError::validation(format!("{field}: invalid URL")))
}

/// `None` for absent or blank input.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_trims_and_checks_length() {
        assert_eq!(bounded("Title", "  Nuit  ", 1, 10).unwrap(), "Nuit");
        assert!(bounded("Title", "   ", 1, 10).is_err());
        assert!(bounded("Title", "abcdefghijk", 1, 10).is_err());
        assert_eq!(bounded("Title", "éééé", 1, 4).unwrap(), "éééé");
    }

    #[test]
    fn urls_must_be_absolute() {
        assert!(absolute_url("url", "https://res.cloudinary.com/x/y.jpg").is_ok());
        assert!(absolute_url("url", "/relative/path.jpg").is_err());
        assert!(absolute_url("url", "not a url").is_err());
    }

    #[test]
    fn blank_optionals_collapse_to_none() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Lyon ".into())), Some("Lyon".into()));
    }
}
