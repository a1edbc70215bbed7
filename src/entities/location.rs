//! Clinic location extraction

/// Known clinic locations, in match priority order
const LOCATIONS: &[&str] = &[
    "midtown",
    "uptown",
    "downtown",
    "brooklyn",
    "queens",
    "bronx",
    "manhattan",
];

/// Default location when none is mentioned
pub const DEFAULT_LOCATION: &str = "Midtown";

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Extract the clinic location mentioned in a message, defaulting to
/// Midtown
pub fn extract_location(text: &str) -> String {
    let lower = text.to_lowercase();
    LOCATIONS
        .iter()
        .find(|location| lower.contains(*location))
        .map(|location| title_case(location))
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(extract_location("book Rivera at Uptown"), "Uptown");
        assert_eq!(extract_location("somewhere in BROOKLYN"), "Brooklyn");
    }

    #[test]
    fn test_first_listed_location_wins() {
        assert_eq!(extract_location("midtown or uptown, either works"), "Midtown");
    }

    #[test]
    fn test_default_location() {
        assert_eq!(extract_location("Book Chen for tomorrow"), "Midtown");
    }
}
