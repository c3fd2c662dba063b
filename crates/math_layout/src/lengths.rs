//! MathML length conversion
//!
//! Lengths are converted to ems. Absolute units go through pixels, so they
//! depend on the pixel size of an em and on the current scale; relative
//! units do not.

use regex_lite::Regex;
use std::sync::OnceLock;

/// Stand-in for an unbounded length
pub const BIGDIMEN: f64 = 1_000_000.0;

/// Pixels per absolute unit
const UNITS: &[(&str, f64)] = &[
    ("px", 1.0),
    ("in", 96.0),
    ("cm", 96.0 / 2.54),
    ("mm", 96.0 / 25.4),
    ("pt", 96.0 / 72.0),
    ("pc", 96.0 / 6.0),
];

/// Ems per relative unit
const RELUNITS: &[(&str, f64)] = &[("em", 1.0), ("ex", 0.431), ("mu", 1.0 / 18.0)];

/// Named lengths, in ems
const MATHSPACE: &[(&str, f64)] = &[
    ("veryverythinmathspace", 1.0 / 18.0),
    ("verythinmathspace", 2.0 / 18.0),
    ("thinmathspace", 3.0 / 18.0),
    ("mediummathspace", 4.0 / 18.0),
    ("thickmathspace", 5.0 / 18.0),
    ("verythickmathspace", 6.0 / 18.0),
    ("veryverythickmathspace", 7.0 / 18.0),
    ("negativeveryverythinmathspace", -1.0 / 18.0),
    ("negativeverythinmathspace", -2.0 / 18.0),
    ("negativethinmathspace", -3.0 / 18.0),
    ("negativemediummathspace", -4.0 / 18.0),
    ("negativethickmathspace", -5.0 / 18.0),
    ("negativeverythickmathspace", -6.0 / 18.0),
    ("negativeveryverythickmathspace", -7.0 / 18.0),
    ("thin", 0.04),
    ("medium", 0.06),
    ("thick", 0.1),
    ("normal", 1.0),
    ("big", 2.0),
    ("small", std::f64::consts::FRAC_1_SQRT_2),
    ("infinity", BIGDIMEN),
];

fn length_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^\s*([-+]?(?:\.\d+|\d+(?:\.\d*)?))?(pt|em|ex|mu|px|pc|in|mm|cm|%)?\s*$").ok()
        })
        .as_ref()
}

/// Look up a named math space
pub fn named_space(name: &str) -> Option<f64> {
    MATHSPACE
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

/// Convert a length string to ems.
///
/// `size` is what percentages and unitless numbers are relative to (and what
/// an empty length resolves to); `scale` and `em` (pixels per em) are used
/// for absolute units.
pub fn length2em(length: &str, size: f64, scale: f64, em: f64) -> f64 {
    let length = length.trim();
    if length.is_empty() {
        return size;
    }
    if let Some(space) = named_space(length) {
        return space;
    }
    let Some(captures) = length_pattern().and_then(|re| re.captures(length)) else {
        return size;
    };
    let m = captures
        .get(1)
        .and_then(|number| number.as_str().parse::<f64>().ok())
        .unwrap_or(1.0);
    let unit = captures.get(2).map(|unit| unit.as_str()).unwrap_or("");
    if let Some((_, px)) = UNITS.iter().find(|(name, _)| *name == unit) {
        return m * px / em / scale;
    }
    if let Some((_, factor)) = RELUNITS.iter().find(|(name, _)| *name == unit) {
        return m * factor;
    }
    if unit == "%" {
        return m / 100.0 * size;
    }
    m * size
}

/// Format a scale factor as a percentage, dropping trailing zeros
pub fn percent(m: f64) -> String {
    format!("{}%", trim_zeros(format!("{:.1}", 100.0 * m)))
}

/// Format a length in ems with three decimals, dropping trailing zeros
pub fn em(m: f64) -> String {
    if m.abs() < 0.001 {
        return "0".to_string();
    }
    format!("{}em", trim_zeros(format!("{:.3}", m)))
}

fn trim_zeros(text: String) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
