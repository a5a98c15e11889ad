//! Per-field heuristic transforms: youth-led classification, region flag
//! decoding, and date resolution.
//!
//! Each heuristic is an ordered rule table evaluated without I/O. Inputs
//! that fall through every rule get a best-effort default plus a nit; they
//! never fail the import.

use std::sync::LazyLock;

use chrono::NaiveDate;
use polidoc_shared::{Region, YouthLed};
use regex::Regex;

// ---------------------------------------------------------------------------
// Youth-led classifier
// ---------------------------------------------------------------------------

/// How a classification rule matches the lowercased cell text.
#[derive(Debug, Clone, Copy)]
enum TextMatch {
    Contains(&'static str),
    Prefix(&'static str),
}

impl TextMatch {
    fn matches(self, lowered: &str) -> bool {
        match self {
            Self::Contains(s) => lowered.contains(s),
            Self::Prefix(s) => lowered.starts_with(s),
        }
    }
}

/// Ordered classification rules. The co-authored checks sit first so that
/// "No, co-authored with adults" and "Yes, co-authored with adults" both
/// classify as Co-authored rather than No/Yes.
const YOUTH_LED_RULES: &[(TextMatch, YouthLed)] = &[
    (TextMatch::Contains("co-authored"), YouthLed::CoAuthored),
    (TextMatch::Contains("co authored"), YouthLed::CoAuthored),
    (TextMatch::Prefix("yes"), YouthLed::Yes),
    (TextMatch::Prefix("youth-led"), YouthLed::Yes),
    (TextMatch::Prefix("no"), YouthLed::No),
    (TextMatch::Prefix("n/a"), YouthLed::NotApplicable),
];

/// Classify free-text youth-involvement. Returns `Unknown` when no rule
/// matches; the caller records a nit and imports the row anyway.
pub fn classify_youth_led(text: &str) -> YouthLed {
    let lowered = text.trim().to_lowercase();
    YOUTH_LED_RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(&lowered))
        .map(|(_, class)| *class)
        .unwrap_or(YouthLed::Unknown)
}

// ---------------------------------------------------------------------------
// Region flag decoder
// ---------------------------------------------------------------------------

/// Decode per-region flag cells. A cell value of `"1"` marks the region
/// applicable. Returns the region set and whether the {N/A} default was
/// applied because no flag was set.
pub fn decode_regions<'a>(flags: impl IntoIterator<Item = (Region, &'a str)>) -> (Vec<Region>, bool) {
    let mut regions: Vec<Region> = flags
        .into_iter()
        .filter(|(_, value)| value.trim() == "1")
        .map(|(region, _)| region)
        .collect();
    regions.sort();
    regions.dedup();

    if regions.is_empty() {
        (vec![Region::NotApplicable], true)
    } else {
        (regions, false)
    }
}

// ---------------------------------------------------------------------------
// Date resolver
// ---------------------------------------------------------------------------

/// Resolved start/end dates plus whether a fallback nit applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDates {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub nit: bool,
}

impl ResolvedDates {
    const UNSET: ResolvedDates = ResolvedDates {
        start: None,
        end: None,
        nit: false,
    };

    fn exact(date: Option<NaiveDate>) -> Self {
        Self {
            start: date,
            end: date,
            nit: false,
        }
    }
}

/// Month names in calendar order; matched by substring so "early march"
/// still resolves.
const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Matches standalone numbers for embedded day-of-month extraction.
static DAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})\b").expect("day regex"));

/// Find the first month name contained in a range side.
fn month_in(text: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, number)| *number)
}

/// Extract an embedded day number (1–30) from a range side.
fn day_in(text: &str) -> Option<u32> {
    DAY_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .find(|day| (1..=30).contains(day))
}

/// Resolve the raw Year and Day/Month cells into start/end dates.
///
/// Cascade, first match wins:
/// 1. Year "N/A" (or blank) → both dates unset.
/// 2. Day/Month parses as a full ISO date → its month/day under Year.
/// 3. Day/Month "N/A" → January 1 of Year.
/// 4. Day/Month is a month name → first of that month.
/// 5. `<side>-<side>` month range → per-side month + optional embedded day,
///    a missing side propagated from the other.
/// 6. Anything else → January 1 of Year, with a nit.
pub fn resolve_dates(raw_year: &str, raw_day_month: &str) -> ResolvedDates {
    let year_text = raw_year.trim();
    if year_text.is_empty() || year_text == "N/A" {
        return ResolvedDates::UNSET;
    }

    let Ok(year) = year_text.parse::<i32>() else {
        // A non-numeric, non-"N/A" year cannot anchor any date.
        return ResolvedDates {
            nit: true,
            ..ResolvedDates::UNSET
        };
    };

    let day_month = raw_day_month.trim();
    let jan_first = ResolvedDates::exact(NaiveDate::from_ymd_opt(year, 1, 1));

    // Full ISO date: keep its month/day, re-anchor to the Year column.
    if let Ok(parsed) = NaiveDate::parse_from_str(day_month, "%Y-%m-%d") {
        use chrono::Datelike;
        return ResolvedDates::exact(NaiveDate::from_ymd_opt(
            year,
            parsed.month(),
            parsed.day(),
        ));
    }

    if day_month == "N/A" {
        return jan_first;
    }

    let lowered = day_month.to_lowercase();

    // Bare month name.
    if let Some((_, month)) = MONTHS.iter().find(|(name, _)| lowered == *name) {
        return ResolvedDates::exact(NaiveDate::from_ymd_opt(year, *month, 1));
    }

    // Month range: "<month-or-range>-<month-or-range>".
    if let Some(resolved) = resolve_month_range(year, &lowered) {
        return resolved;
    }

    ResolvedDates {
        nit: true,
        ..jan_first
    }
}

/// Parse a two-sided month range like "March-April" or "15 March-2 April".
fn resolve_month_range(year: i32, lowered: &str) -> Option<ResolvedDates> {
    let sides: Vec<&str> = lowered.split('-').collect();
    if sides.len() != 2 {
        return None;
    }

    let mut start_month = month_in(sides[0]);
    let mut end_month = month_in(sides[1]);

    // Propagate a missing side's month from the other side.
    match (start_month, end_month) {
        (None, None) => return None,
        (Some(m), None) => end_month = Some(m),
        (None, Some(m)) => start_month = Some(m),
        _ => {}
    }
    let (start_month, end_month) = (start_month?, end_month?);

    let start_day = day_in(sides[0]).unwrap_or(1);
    let end_day = day_in(sides[1]).unwrap_or(if start_month == end_month {
        start_day
    } else {
        1
    });

    let start = NaiveDate::from_ymd_opt(year, start_month, start_day)?;
    let end = NaiveDate::from_ymd_opt(year, end_month, end_day)?;

    Some(ResolvedDates {
        start: Some(start),
        end: Some(end),
        nit: false,
    })
}
