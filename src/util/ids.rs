//! ID generation utilities.
//!
//! Generates unique identifiers for panes. Ids double as element
//! identifiers in the widget host, so they stay alphanumeric.

use nanoid::nanoid;

/// Alphabet: alphanumeric only (no `-` or `~`)
const ALPHABET: [char; 62] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Pane ID prefix
const PANE_PREFIX: &str = "pane-";

/// Length of the random suffix
const PANE_ID_LEN: usize = 12;

/// Generate a new pane ID with "pane-" prefix.
///
/// Format: `pane-XXXXXXXXXXXX` (12 alphanumeric characters)
pub fn new_pane_id() -> String {
    format!("{}{}", PANE_PREFIX, nanoid!(PANE_ID_LEN, &ALPHABET))
}

/// Check if a string is a generated pane ID.
pub fn is_valid_pane_id(id: &str) -> bool {
    let Some(suffix) = id.strip_prefix(PANE_PREFIX) else {
        return false;
    };
    suffix.len() == PANE_ID_LEN && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}
