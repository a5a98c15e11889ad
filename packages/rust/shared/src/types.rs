//! Core domain types for the Polidoc catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// YouthLed
// ---------------------------------------------------------------------------

/// Classified youth-involvement status, distilled from the free-text
/// "Youth-led/authored" spreadsheet column.
///
/// The classified value is canonical for filtering and faceting; the raw
/// text is kept alongside as informational metadata only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YouthLed {
    #[serde(rename = "Yes")]
    Yes,
    #[serde(rename = "No")]
    No,
    #[serde(rename = "Co-authored")]
    CoAuthored,
    #[serde(rename = "N/A")]
    NotApplicable,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl YouthLed {
    /// Display string, identical to the stored form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
            Self::CoAuthored => "Co-authored",
            Self::NotApplicable => "N/A",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse the stored form back into the enum.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            "Co-authored" => Some(Self::CoAuthored),
            "N/A" => Some(Self::NotApplicable),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Canonical facet display order: Yes, Co-authored, No, N/A, Unknown.
    pub fn facet_rank(self) -> u8 {
        match self {
            Self::Yes => 0,
            Self::CoAuthored => 1,
            Self::No => 2,
            Self::NotApplicable => 3,
            Self::Unknown => 4,
        }
    }
}

impl std::fmt::Display for YouthLed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// Geographic region tags. The spreadsheet carries one boolean flag column
/// per tag; entries with no flags set default to `NotApplicable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "East and Southern Africa")]
    EastSouthernAfrica,
    #[serde(rename = "East and Central Asia")]
    EastCentralAsia,
    #[serde(rename = "Southeast Asia and the Pacific")]
    SoutheastAsiaPacific,
    #[serde(rename = "Europe and Eurasia")]
    EuropeEurasia,
    #[serde(rename = "Latin America and the Caribbean")]
    LatinAmericaCaribbean,
    #[serde(rename = "Middle East and North Africa")]
    MiddleEastNorthAfrica,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South Asia")]
    SouthAsia,
    #[serde(rename = "West and Central Africa")]
    WestCentralAfrica,
    #[serde(rename = "Global")]
    Global,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Region {
    /// All region tags, in spreadsheet column order.
    pub const ALL: [Region; 11] = [
        Region::EastSouthernAfrica,
        Region::EastCentralAsia,
        Region::SoutheastAsiaPacific,
        Region::EuropeEurasia,
        Region::LatinAmericaCaribbean,
        Region::MiddleEastNorthAfrica,
        Region::NorthAmerica,
        Region::SouthAsia,
        Region::WestCentralAfrica,
        Region::Global,
        Region::NotApplicable,
    ];

    /// Display name, identical to the spreadsheet header and stored form.
    pub fn name(self) -> &'static str {
        match self {
            Self::EastSouthernAfrica => "East and Southern Africa",
            Self::EastCentralAsia => "East and Central Asia",
            Self::SoutheastAsiaPacific => "Southeast Asia and the Pacific",
            Self::EuropeEurasia => "Europe and Eurasia",
            Self::LatinAmericaCaribbean => "Latin America and the Caribbean",
            Self::MiddleEastNorthAfrica => "Middle East and North Africa",
            Self::NorthAmerica => "North America",
            Self::SouthAsia => "South Asia",
            Self::WestCentralAfrica => "West and Central Africa",
            Self::Global => "Global",
            Self::NotApplicable => "N/A",
        }
    }

    /// Parse a stored display name back into the enum.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.name() == s)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A catalog entry, as persisted.
///
/// Multi-value fields are kept sorted and deduplicated (see
/// [`Entry::normalize`]) so that structural equality — the basis of the
/// diff reconciler — is order-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Spreadsheet-assigned unique document identifier.
    pub item_id: String,
    pub title: String,
    pub authors: String,
    pub url: String,
    /// Publishing organizations (unordered set).
    pub org_publishers: Vec<String>,
    /// Publisher's own document number; empty when the sheet said "N/A".
    pub org_doc_id: String,
    pub org_type: String,
    pub doc_type: String,
    pub abstract_text: String,
    pub youth_led: YouthLed,
    /// Raw "Youth-led/authored" cell text, informational only.
    pub youth_led_details: String,
    pub keywords: Vec<String>,
    pub regions: Vec<Region>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Resolved language code from the registry.
    pub language: String,
    /// Closed alternate-language class, self included.
    pub alt_language_ids: Vec<String>,
    /// Cross-references to other catalog entries.
    pub related_ids: Vec<String>,
}

impl Entry {
    /// Sort and dedup every multi-value field in place.
    pub fn normalize(&mut self) {
        for list in [
            &mut self.org_publishers,
            &mut self.keywords,
            &mut self.alt_language_ids,
            &mut self.related_ids,
        ] {
            list.sort();
            list.dedup();
        }
        self.regions.sort();
        self.regions.dedup();
    }
}
