use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static FLOAT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.0+$").unwrap());

/// Trim whitespace + strip outer quotes if present. `None` when nothing is left.
pub fn clean_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let inner = if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

/// Strip the `.0` left behind when FIPS codes were stored as floats.
pub fn normalize_fips(raw: &str) -> Option<String> {
    clean_str(raw).map(|s| FLOAT_SUFFIX.replace(&s, "").into_owned())
}

/// Integer counts; tolerates `"12.0"`. Anything else is missing.
pub fn parse_count(column: &str, raw: &str) -> Option<i64> {
    let s = clean_str(raw)?;
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => {
            debug!(column, value = %s, "unparseable count, treating as missing");
            None
        }
    }
}

pub fn parse_float(column: &str, raw: &str) -> Option<f64> {
    let s = clean_str(raw)?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!(column, value = %s, "unparseable number, treating as missing");
            None
        }
    }
}
