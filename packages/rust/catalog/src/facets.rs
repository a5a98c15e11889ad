//! Facet aggregation over the live catalog.
//!
//! A [`FacetSnapshot`] holds every filterable dimension with its values
//! in display order. Snapshots are rebuilt after each import and shared
//! behind an `Arc`, so browse traffic never aggregates on the fly.

use libsql::params;
use polidoc_shared::{Result, SearchConfig, YouthLed, languages};

use crate::store::{Catalog, storage_err};

/// One facet value with its entry count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// A language facet value: registry code plus display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFacet {
    pub code: String,
    pub name: String,
    pub count: u64,
}

/// All facet dimensions, each in its canonical display order.
#[derive(Debug, Clone, Default)]
pub struct FacetSnapshot {
    /// Yes, Co-authored, No, N/A, Unknown; absent classes omitted.
    pub youth_led: Vec<FacetCount>,
    /// Publication years, newest first, placeholder years excluded.
    pub years: Vec<i32>,
    /// Document types by frequency, most common first.
    pub doc_types: Vec<FacetCount>,
    /// Region names alphabetically, with Global and N/A pinned last.
    pub regions: Vec<String>,
    /// Languages by display name.
    pub languages: Vec<LanguageFacet>,
}

impl Catalog {
    /// Aggregate a fresh facet snapshot from the entries table.
    pub async fn build_facets(&self, config: &SearchConfig) -> Result<FacetSnapshot> {
        Ok(FacetSnapshot {
            youth_led: self.youth_led_facet().await?,
            years: self.year_facet(config.min_facet_year).await?,
            doc_types: self.doc_type_facet(config.entry_type_min_count).await?,
            regions: self.region_facet().await?,
            languages: self.language_facet().await?,
        })
    }

    async fn youth_led_facet(&self) -> Result<Vec<FacetCount>> {
        let mut rows = self
            .conn
            .query(
                "SELECT youth_led, COUNT(*) FROM entries GROUP BY youth_led",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut counts: Vec<(YouthLed, u64)> = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let value: String = row.get(0).map_err(storage_err)?;
            let count: u64 = row.get(1).map_err(storage_err)?;
            if let Some(class) = YouthLed::from_str_opt(&value) {
                counts.push((class, count));
            }
        }
        counts.sort_by_key(|(class, _)| class.facet_rank());
        Ok(counts
            .into_iter()
            .map(|(class, count)| FacetCount {
                value: class.as_str().to_string(),
                count,
            })
            .collect())
    }

    async fn year_facet(&self, min_year: i32) -> Result<Vec<i32>> {
        let mut rows = self
            .conn
            .query(
                "SELECT DISTINCT CAST(substr(start_date, 1, 4) AS INTEGER)
                 FROM entries WHERE start_date IS NOT NULL",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut years = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let year: i64 = row.get(0).map_err(storage_err)?;
            let year = year as i32;
            if year > min_year {
                years.push(year);
            }
        }
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }

    async fn doc_type_facet(&self, min_count: u32) -> Result<Vec<FacetCount>> {
        let mut rows = self
            .conn
            .query(
                "SELECT doc_type, COUNT(*) AS n FROM entries
                 WHERE doc_type != '' GROUP BY doc_type
                 ORDER BY n DESC, doc_type ASC",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut doc_types = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let value: String = row.get(0).map_err(storage_err)?;
            let count: u64 = row.get(1).map_err(storage_err)?;
            if count >= u64::from(min_count) {
                doc_types.push(FacetCount { value, count });
            }
        }
        Ok(doc_types)
    }

    async fn region_facet(&self) -> Result<Vec<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT DISTINCT json_each.value FROM entries, json_each(entries.regions)",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut regions: Vec<String> = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            regions.push(row.get(0).map_err(storage_err)?);
        }
        // Alphabetical, with the two catch-all values pinned to the end.
        regions.sort_by_key(|name| {
            (
                matches!(name.as_str(), "Global" | "N/A"),
                name.to_lowercase(),
            )
        });
        Ok(regions)
    }

    async fn language_facet(&self) -> Result<Vec<LanguageFacet>> {
        let mut rows = self
            .conn
            .query(
                "SELECT language, COUNT(*) FROM entries GROUP BY language",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut facets = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let code: String = row.get(0).map_err(storage_err)?;
            let count: u64 = row.get(1).map_err(storage_err)?;
            let name = languages::display_name(&code).to_string();
            facets.push(LanguageFacet { code, name, count });
        }
        facets.sort_by_key(|f| f.name.to_lowercase());
        Ok(facets)
    }
}
