use crate::model::FlightCategory;

pub mod decoded;
pub mod template;

pub use decoded::render_decoded;
pub use template::{OUTPUT_CAPACITY, render_template};

pub(crate) const BOLD_RED: &str = "\x1b[1;31m";
pub(crate) const BOLD_GREEN: &str = "\x1b[1;32m";
pub(crate) const BOLD_YELLOW: &str = "\x1b[1;33m";
pub(crate) const BOLD_BLUE: &str = "\x1b[1;34m";
pub(crate) const BOLD_MAGENTA: &str = "\x1b[1;35m";
pub(crate) const RESET: &str = "\x1b[0m";

/// Rendering of fields the record does not carry.
pub(crate) const UNKNOWN_VALUE: &str = "(unknown)";

pub(crate) fn paint(text: &str, color: &str) -> String {
    format!("{color}{text}{RESET}")
}

pub(crate) fn paint_if(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        paint(text, color)
    } else {
        text.to_string()
    }
}

pub(crate) fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Flight-category label for display, colored by severity when enabled.
/// An unknown category renders as "???" and is never colored.
pub fn flight_category_label(category: FlightCategory, color: bool) -> String {
    if !color {
        return category.code().to_string();
    }
    match category {
        FlightCategory::Vfr => paint(category.code(), BOLD_GREEN),
        FlightCategory::Mvfr => paint(category.code(), BOLD_BLUE),
        FlightCategory::Ifr => paint(category.code(), BOLD_RED),
        FlightCategory::Lifr => paint(category.code(), BOLD_MAGENTA),
        FlightCategory::Unknown => category.code().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_color_by_severity() {
        assert_eq!(flight_category_label(FlightCategory::Vfr, false), "VFR");
        assert_eq!(
            flight_category_label(FlightCategory::Vfr, true),
            "\x1b[1;32mVFR\x1b[0m"
        );
        assert_eq!(
            flight_category_label(FlightCategory::Mvfr, true),
            "\x1b[1;34mMVFR\x1b[0m"
        );
        assert_eq!(
            flight_category_label(FlightCategory::Ifr, true),
            "\x1b[1;31mIFR\x1b[0m"
        );
        assert_eq!(
            flight_category_label(FlightCategory::Lifr, true),
            "\x1b[1;35mLIFR\x1b[0m"
        );
    }

    #[test]
    fn unknown_category_is_never_colored() {
        assert_eq!(flight_category_label(FlightCategory::Unknown, true), "???");
        assert_eq!(flight_category_label(FlightCategory::Unknown, false), "???");
    }

    #[test]
    fn fahrenheit_conversion() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(15.0), 59.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }
}
