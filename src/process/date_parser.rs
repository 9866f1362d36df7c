use chrono::{NaiveDate, NaiveDateTime};

/// Layouts seen in the `Last_Update` column across report vintages.
/// Two-digit years go first; `%Y` would accept `20` as year 20.
const LAST_UPDATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a report `Last_Update` value. `None` if no known layout matches.
pub fn parse_last_update(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    LAST_UPDATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// `"04/01/2020"` → 2020-04-01, the layout used by projection rows.
pub fn parse_projection_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%m/%d/%Y").ok()
}
