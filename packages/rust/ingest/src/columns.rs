//! Header-to-role column mapping.
//!
//! The spreadsheet's header row is matched against an ordered table of
//! case-insensitive rules (exact, prefix, substring). Every role is
//! required; a header row that leaves any role unmatched fails with a
//! schema error naming all of the missing roles at once.

use std::collections::HashMap;

use polidoc_shared::{PolidocError, Region, Result};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Canonical meaning assigned to a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    ItemId,
    Authors,
    Year,
    Title,
    OrgPublisher,
    DocNumber,
    DayMonth,
    Url,
    Languages,
    AlternateLanguages,
    RelatedDocuments,
    YouthLed,
    Abstract,
    OrgType,
    DocType,
    Keywords,
    /// One boolean-style flag column per region tag.
    RegionFlag(Region),
}

impl ColumnRole {
    /// Human-readable label, as used in schema error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::ItemId => "Item",
            Self::Authors => "Author(s)",
            Self::Year => "Year",
            Self::Title => "Title",
            Self::OrgPublisher => "Org / Publisher",
            Self::DocNumber => "Doc #",
            Self::DayMonth => "Day / Month",
            Self::Url => "URL",
            Self::Languages => "Languages available",
            Self::AlternateLanguages => "Alternate Languages",
            Self::RelatedDocuments => "Related Documents",
            Self::YouthLed => "Youth-led/ authored",
            Self::Abstract => "Abstract/ Exec Summary",
            Self::OrgType => "Type of org",
            Self::DocType => "Type of document",
            Self::Keywords => "Keywords",
            Self::RegionFlag(region) => region.name(),
        }
    }

    /// Every role the schema requires. All are mandatory.
    pub fn required() -> Vec<ColumnRole> {
        let mut roles = vec![
            Self::ItemId,
            Self::Authors,
            Self::Year,
            Self::Title,
            Self::OrgPublisher,
            Self::DocNumber,
            Self::DayMonth,
            Self::Url,
            Self::Languages,
            Self::AlternateLanguages,
            Self::RelatedDocuments,
            Self::YouthLed,
            Self::Abstract,
            Self::OrgType,
            Self::DocType,
            Self::Keywords,
        ];
        roles.extend(Region::ALL.map(Self::RegionFlag));
        roles
    }
}

// ---------------------------------------------------------------------------
// Matching rules
// ---------------------------------------------------------------------------

/// How a rule matches a simplified (trimmed, lowercased) header cell.
#[derive(Debug, Clone, Copy)]
enum HeaderMatch {
    Exact(&'static str),
    Prefix(&'static str),
    Substring(&'static str),
}

impl HeaderMatch {
    fn matches(self, simplified: &str) -> bool {
        match self {
            Self::Exact(s) => simplified == s,
            Self::Prefix(s) => simplified.starts_with(s),
            Self::Substring(s) => simplified.contains(s),
        }
    }
}

/// Ordered rule table. The first matching rule wins, so narrower rules
/// (exact) sit before broader ones (substring) where headers overlap.
const HEADER_RULES: &[(HeaderMatch, ColumnRole)] = &[
    (HeaderMatch::Exact("item"), ColumnRole::ItemId),
    (HeaderMatch::Prefix("author"), ColumnRole::Authors),
    (HeaderMatch::Exact("year"), ColumnRole::Year),
    (HeaderMatch::Exact("title"), ColumnRole::Title),
    (HeaderMatch::Substring("publisher"), ColumnRole::OrgPublisher),
    (HeaderMatch::Prefix("doc #"), ColumnRole::DocNumber),
    (HeaderMatch::Substring("month"), ColumnRole::DayMonth),
    (HeaderMatch::Exact("url"), ColumnRole::Url),
    (HeaderMatch::Exact("languages available"), ColumnRole::Languages),
    (
        HeaderMatch::Exact("alternate languages"),
        ColumnRole::AlternateLanguages,
    ),
    (
        HeaderMatch::Exact("related documents"),
        ColumnRole::RelatedDocuments,
    ),
    (HeaderMatch::Prefix("youth-led"), ColumnRole::YouthLed),
    (HeaderMatch::Prefix("youth authored"), ColumnRole::YouthLed),
    (HeaderMatch::Prefix("abstract"), ColumnRole::Abstract),
    (HeaderMatch::Prefix("type of org"), ColumnRole::OrgType),
    (HeaderMatch::Prefix("type of document"), ColumnRole::DocType),
    (HeaderMatch::Prefix("keywords"), ColumnRole::Keywords),
    (
        HeaderMatch::Exact("east and southern africa"),
        ColumnRole::RegionFlag(Region::EastSouthernAfrica),
    ),
    (
        HeaderMatch::Exact("east and central asia"),
        ColumnRole::RegionFlag(Region::EastCentralAsia),
    ),
    (
        HeaderMatch::Exact("southeast asia and the pacific"),
        ColumnRole::RegionFlag(Region::SoutheastAsiaPacific),
    ),
    (
        HeaderMatch::Exact("europe and eurasia"),
        ColumnRole::RegionFlag(Region::EuropeEurasia),
    ),
    (
        HeaderMatch::Exact("latin america and the caribbean"),
        ColumnRole::RegionFlag(Region::LatinAmericaCaribbean),
    ),
    (
        HeaderMatch::Exact("middle east and north africa"),
        ColumnRole::RegionFlag(Region::MiddleEastNorthAfrica),
    ),
    (
        HeaderMatch::Exact("north america"),
        ColumnRole::RegionFlag(Region::NorthAmerica),
    ),
    (
        HeaderMatch::Exact("south asia"),
        ColumnRole::RegionFlag(Region::SouthAsia),
    ),
    (
        HeaderMatch::Exact("west and central africa"),
        ColumnRole::RegionFlag(Region::WestCentralAfrica),
    ),
    (
        HeaderMatch::Exact("global"),
        ColumnRole::RegionFlag(Region::Global),
    ),
    (
        HeaderMatch::Exact("n/a"),
        ColumnRole::RegionFlag(Region::NotApplicable),
    ),
];

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Lowercase and trim a raw header cell before rule matching.
fn simplify(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Map a header row to column indexes per role.
///
/// Unrecognized headers are ignored. When the same role matches twice the
/// later column wins, mirroring how duplicate headers behave in practice.
/// Fails with a schema error naming every required role left unmatched.
pub fn map_header(headers: &[String]) -> Result<HashMap<ColumnRole, usize>> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let simplified = simplify(header);
        if simplified.is_empty() {
            continue;
        }
        if let Some((_, role)) = HEADER_RULES
            .iter()
            .find(|(pattern, _)| pattern.matches(&simplified))
        {
            mapping.insert(*role, index);
        }
    }

    let missing: Vec<&str> = ColumnRole::required()
        .into_iter()
        .filter(|role| !mapping.contains_key(role))
        .map(ColumnRole::label)
        .collect();

    if !missing.is_empty() {
        return Err(PolidocError::Schema {
            missing: missing.join(", "),
        });
    }

    Ok(mapping)
}
