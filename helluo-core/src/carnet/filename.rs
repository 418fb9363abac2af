use once_cell::sync::Lazy;
use regex::Regex;

/// Position of an uploaded page: which carnet, which page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CarnetCoordinate {
    pub carnet_number: u32,
    pub page_number: u32,
}

/// Accepted name shapes, in priority order. Matching is done on the name
/// with its extension removed.
static CARNET_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        // C.1.2, C.C.1.2, C.C 1.2
        Regex::new(r"(?i)^C\.?C?\s*\.?(\d+)\.(\d+)$").expect("valid regex"),
        // C 1.2, C.C 1.2
        Regex::new(r"(?i)^C\.?C?\s+(\d+)\.(\d+)$").expect("valid regex"),
        // C 1 2, C.C 1 2
        Regex::new(r"(?i)^C\.?C?\s*(\d+)\s+(\d+)$").expect("valid regex"),
    ]
});

/// Maps an uploaded filename such as `C.1.2.jpg` to its carnet and page.
///
/// Returns `None` for names that match no accepted shape, or whose numbers
/// are zero or do not fit a `u32`.
pub fn parse_carnet_filename(filename: &str) -> Option<CarnetCoordinate> {
    let stem = strip_extension(filename);

    CARNET_PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(stem)?;
        let carnet_number = parse_positive(captures.get(1)?.as_str())?;
        let page_number = parse_positive(captures.get(2)?.as_str())?;
        Some(CarnetCoordinate {
            carnet_number,
            page_number,
        })
    })
}

/// Drops the final `.ext` segment. A trailing segment containing a path
/// separator, or an empty one, is not an extension.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) => {
            let ext = &filename[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                filename
            } else {
                &filename[..dot]
            }
        }
        None => filename,
    }
}

fn parse_positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(carnet_number: u32, page_number: u32) -> Option<CarnetCoordinate> {
        Some(CarnetCoordinate {
            carnet_number,
            page_number,
        })
    }

    #[test]
    fn accepts_every_supported_shape() {
        for name in [
            "C.1.2.jpg",
            "C.C.1.2.png",
            "C.C 1.2.jpeg",
            "C 1.2.webp",
            "C 1 2.jpg",
            "C.C 1 2.jpg",
            "CC1.2.jpg",
        ] {
            assert_eq!(parse_carnet_filename(name), coord(1, 2), "{name}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(parse_carnet_filename("c.1.2.JPG"), coord(1, 2));
        assert_eq!(parse_carnet_filename("c.c 1.2.jpg"), coord(1, 2));
        assert_eq!(parse_carnet_filename("c 1 2.Png"), coord(1, 2));
    }

    #[test]
    fn tolerates_extra_whitespace() {
        assert_eq!(parse_carnet_filename("C.C   3.14.jpg"), coord(3, 14));
        assert_eq!(parse_carnet_filename("C 3    14.jpg"), coord(3, 14));
    }

    #[test]
    fn multi_digit_numbers() {
        assert_eq!(parse_carnet_filename("C.12.105.jpg"), coord(12, 105));
        assert_eq!(parse_carnet_filename("C.007.010.jpg"), coord(7, 10));
    }

    #[test]
    fn rejects_unrelated_names() {
        for name in [
            "random.jpg",
            "C1-2.jpg",
            "C.1.jpg",
            "D.1.2.jpg",
            "C.1.2.3.jpg",
            "carnet 1 2.jpg",
            "",
            ".jpg",
        ] {
            assert_eq!(parse_carnet_filename(name), None, "{name:?}");
        }
    }

    #[test]
    fn final_dot_segment_is_treated_as_extension() {
        // Without an extension the page number itself is stripped.
        assert_eq!(parse_carnet_filename("C.1.2"), None);
        assert_eq!(parse_carnet_filename("C 1 2"), coord(1, 2));
    }

    #[test]
    fn rejects_zero_and_overflowing_numbers() {
        assert_eq!(parse_carnet_filename("C.0.2.jpg"), None);
        assert_eq!(parse_carnet_filename("C.1.0.jpg"), None);
        assert_eq!(parse_carnet_filename("C.99999999999.1.jpg"), None);
    }
}
