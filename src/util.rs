//! Utility functions for Flowcast.

/// Characters stripped from watershed and subbasin names.
const STRIPPED_CHARS: &[char] = &[
    '!', '@', '#', '$', '.', '/', '?', ':', ';', '%', '*', '^', '&', '(', ')', '>', '<', ',', '-',
    '"', '\'', '\\',
];

/// Normalize a watershed or subbasin name into its on-disk form.
///
/// Output folders and member file names use the lowercase, underscore-joined
/// form of the display name with punctuation removed, so "Nfie Texas Gulf" and
/// "nfie_texas_gulf" address the same folder.
pub fn format_name(name: &str) -> String {
    name.trim()
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect()
}

/// Clamp a discharge value to be non-negative, leaving missing values as NaN.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}
