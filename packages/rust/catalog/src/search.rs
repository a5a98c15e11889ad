//! Faceted full-text search over the catalog.
//!
//! Queries run against the trigger-maintained FTS5 index; facet filters
//! are conjunctive SQL predicates on the entries table. Scores negate
//! bm25 so that higher is better and every sort clause reads descending
//! on relevance. Ties always break on the entry id, keeping page walks
//! stable.

use std::collections::HashMap;

use libsql::{Value, params_from_iter};
use polidoc_shared::{Entry, Region, Result, SearchConfig, YouthLed, languages};

use crate::store::{Catalog, ENTRY_COLUMNS, row_to_entry, storage_err};

/// Which FTS columns the query text runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Title, abstract, authors, keywords, publishers, and doc number.
    #[default]
    All,
    Title,
    Abstract,
}

impl SearchScope {
    fn fts_column(self) -> &'static str {
        match self {
            Self::All => "alltext",
            Self::Title => "title",
            Self::Abstract => "abstract",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "title" => Some(Self::Title),
            "abstract" => Some(Self::Abstract),
            _ => None,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchSort {
    /// Best match first; without query text this falls back to newest
    /// first.
    #[default]
    Relevance,
    DateAsc,
    DateDesc,
    Alphabetical,
}

impl SearchSort {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relevance" => Some(Self::Relevance),
            "dateasc" => Some(Self::DateAsc),
            "datedesc" => Some(Self::DateDesc),
            "abc" => Some(Self::Alphabetical),
            _ => None,
        }
    }

    fn order_clause(self, has_query: bool) -> &'static str {
        match self {
            Self::Relevance if has_query => "score DESC, e.start_date DESC, e.id ASC",
            Self::Relevance => "e.start_date DESC, e.id ASC",
            Self::DateDesc => "e.start_date DESC, e.id DESC",
            Self::DateAsc => "e.start_date ASC, e.id ASC",
            Self::Alphabetical => "e.title COLLATE NOCASE ASC, e.start_date DESC, e.id ASC",
        }
    }
}

/// One search invocation. Facet filters are conjunctive; `page` is
/// 1-based.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub scope: SearchScope,
    pub sort: SearchSort,
    pub page: u32,
    pub youth_led: Option<YouthLed>,
    pub region: Option<Region>,
    pub year: Option<i32>,
    pub doc_type: Option<String>,
    /// Exact keyword membership.
    pub keyword: Option<String>,
    /// Registry language code.
    pub language: Option<String>,
}

/// One result row with display decoration.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub entry: Entry,
    /// Display name of the entry's language.
    pub language_name: String,
    /// Display names of the languages its alternates are available in,
    /// sorted case-insensitively, self included.
    pub available_languages: Vec<String>,
}

/// One page of results plus the numbers the result header needs.
#[derive(Debug)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub total_entries: u64,
    /// 1-based ordinal of the first hit on this page; 0 when empty.
    pub start_entry: u64,
    /// 1-based ordinal of the last hit on this page; 0 when empty.
    pub end_entry: u64,
    pub page: u32,
    pub total_pages: u32,
    /// Youth-led distribution of the result set, every active filter
    /// applied, in canonical facet order.
    pub youth_led_counts: Vec<(YouthLed, u64)>,
}

/// Turn free-form query text into a safe FTS5 match expression against
/// one column. Each whitespace token becomes a quoted phrase; embedded
/// quotes are doubled. Tokens without any alphanumeric character would
/// tokenize to an empty phrase and are dropped. Returns `None` when
/// nothing searchable remains.
pub(crate) fn fts_match_expr(query: &str, scope: SearchScope) -> Option<String> {
    let phrases: Vec<String> = query
        .split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect();
    if phrases.is_empty() {
        return None;
    }
    Some(format!("{} : ({})", scope.fts_column(), phrases.join(" ")))
}

/// The FROM/WHERE tail of a search statement plus its bound values.
struct QueryParts {
    from_where: String,
    values: Vec<Value>,
}

fn build_parts(request: &SearchRequest) -> QueryParts {
    let mut values: Vec<Value> = Vec::new();
    let mut predicates: Vec<String> = Vec::new();

    let match_expr = fts_match_expr(&request.query, request.scope);
    let from = if let Some(expr) = &match_expr {
        values.push(Value::Text(expr.clone()));
        predicates.push(format!("entries_fts MATCH ?{}", values.len()));
        "FROM entries_fts fts JOIN entries e ON e.rowid = fts.rowid"
    } else {
        "FROM entries e"
    };

    if let Some(youth_led) = request.youth_led {
        values.push(Value::Text(youth_led.as_str().to_string()));
        predicates.push(format!("e.youth_led = ?{}", values.len()));
    }
    if let Some(region) = request.region {
        values.push(Value::Text(region.name().to_string()));
        predicates.push(format!(
            "EXISTS (SELECT 1 FROM json_each(e.regions) WHERE json_each.value = ?{})",
            values.len()
        ));
    }
    if let Some(year) = request.year {
        values.push(Value::Text(format!("{year:04}")));
        predicates.push(format!("substr(e.start_date, 1, 4) = ?{}", values.len()));
    }
    if let Some(doc_type) = &request.doc_type {
        values.push(Value::Text(doc_type.clone()));
        predicates.push(format!("e.doc_type = ?{}", values.len()));
    }
    if let Some(keyword) = &request.keyword {
        values.push(Value::Text(keyword.clone()));
        predicates.push(format!(
            "EXISTS (SELECT 1 FROM json_each(e.keywords) WHERE json_each.value = ?{})",
            values.len()
        ));
    }
    if let Some(language) = &request.language {
        values.push(Value::Text(language.clone()));
        predicates.push(format!("e.language = ?{}", values.len()));
    }

    let where_clause = if predicates.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", predicates.join(" AND "))
    };

    QueryParts {
        from_where: format!("{from}{where_clause}"),
        values,
    }
}

impl Catalog {
    /// Run a faceted search and return one page of results.
    pub async fn search(
        &self,
        request: &SearchRequest,
        config: &SearchConfig,
    ) -> Result<SearchResults> {
        let per_page = u64::from(config.entries_per_page.max(1));
        let page = request.page.max(1);
        let has_query = fts_match_expr(&request.query, request.scope).is_some();

        let parts = build_parts(request);

        let total_entries = {
            let sql = format!("SELECT COUNT(*) {}", parts.from_where);
            let mut rows = self
                .conn
                .query(&sql, params_from_iter(parts.values.clone()))
                .await
                .map_err(storage_err)?;
            match rows.next().await {
                Ok(Some(row)) => row.get::<u64>(0).unwrap_or(0),
                _ => 0,
            }
        };

        let prefixed: Vec<String> = ENTRY_COLUMNS
            .split(", ")
            .map(|column| format!("e.{}", column.trim()))
            .collect();
        let score_expr = if has_query {
            "-bm25(entries_fts)"
        } else {
            "0.0"
        };
        let sql = format!(
            "SELECT {}, {score_expr} AS score {} ORDER BY {} LIMIT {} OFFSET {}",
            prefixed.join(", "),
            parts.from_where,
            request.sort.order_clause(has_query),
            per_page,
            per_page * u64::from(page - 1),
        );

        let mut rows = self
            .conn
            .query(&sql, params_from_iter(parts.values.clone()))
            .await
            .map_err(storage_err)?;
        let mut entries = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            entries.push(row_to_entry(&row)?);
        }

        let hits = self.decorate(entries).await?;
        let youth_led_counts = self.youth_led_counts(request).await?;

        let total_pages = (total_entries.div_ceil(per_page)).max(1) as u32;
        let (start_entry, end_entry) = if total_entries == 0 {
            (0, 0)
        } else {
            let start = per_page * u64::from(page - 1) + 1;
            let end = (per_page * u64::from(page)).min(total_entries);
            (start.min(total_entries), end)
        };

        Ok(SearchResults {
            hits,
            total_entries,
            start_entry,
            end_entry,
            page,
            total_pages,
            youth_led_counts,
        })
    }

    /// Youth-led distribution of the fully filtered result set, in
    /// canonical facet order.
    async fn youth_led_counts(&self, request: &SearchRequest) -> Result<Vec<(YouthLed, u64)>> {
        let parts = build_parts(request);
        let sql = format!(
            "SELECT e.youth_led, COUNT(*) {} GROUP BY e.youth_led",
            parts.from_where
        );
        let mut rows = self
            .conn
            .query(&sql, params_from_iter(parts.values))
            .await
            .map_err(storage_err)?;

        let mut counts = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let value: String = row.get(0).map_err(storage_err)?;
            let count: u64 = row.get(1).map_err(storage_err)?;
            if let Some(class) = YouthLed::from_str_opt(&value) {
                counts.push((class, count));
            }
        }
        counts.sort_by_key(|(class, _)| class.facet_rank());
        Ok(counts)
    }

    /// Attach language display names to a page of entries. Alternate
    /// languages come from one batched lookup over the page's class ids.
    async fn decorate(&self, entries: Vec<Entry>) -> Result<Vec<SearchHit>> {
        let mut wanted: Vec<&str> = entries
            .iter()
            .flat_map(|entry| entry.alt_language_ids.iter().map(String::as_str))
            .collect();
        wanted.sort_unstable();
        wanted.dedup();

        let mut codes: HashMap<String, String> = HashMap::new();
        if !wanted.is_empty() {
            let placeholders: Vec<String> =
                (1..=wanted.len()).map(|n| format!("?{n}")).collect();
            let sql = format!(
                "SELECT id, language FROM entries WHERE id IN ({})",
                placeholders.join(", ")
            );
            let values: Vec<Value> = wanted
                .iter()
                .map(|id| Value::Text((*id).to_string()))
                .collect();
            let mut rows = self
                .conn
                .query(&sql, params_from_iter(values))
                .await
                .map_err(storage_err)?;
            while let Ok(Some(row)) = rows.next().await {
                let id: String = row.get(0).map_err(storage_err)?;
                let code: String = row.get(1).map_err(storage_err)?;
                codes.insert(id, code);
            }
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let mut available: Vec<String> = entry
                    .alt_language_ids
                    .iter()
                    .filter_map(|id| codes.get(id))
                    .map(|code| languages::display_name(code).to_string())
                    .collect();
                available.sort_by_key(|name| name.to_lowercase());
                available.dedup();
                let language_name = languages::display_name(&entry.language).to_string();
                SearchHit {
                    entry,
                    language_name,
                    available_languages: available,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{entry, test_catalog};
    use chrono::NaiveDate;

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            page: 1,
            ..SearchRequest::default()
        }
    }

    async fn seeded() -> Catalog {
        let catalog = test_catalog().await;
        let mut a = entry("YPS-001", "Youth Participation in Peace Processes", "en");
        a.abstract_text = "A study of inclusion mechanisms.".into();
        a.youth_led = YouthLed::Yes;
        a.doc_type = "Report".into();
        a.regions = vec![Region::Global];
        a.keywords = vec!["inclusion".into(), "mediation".into()];
        a.start_date = NaiveDate::from_ymd_opt(2019, 5, 1);
        a.alt_language_ids = vec!["YPS-001".into(), "YPS-002".into()];

        let mut b = entry("YPS-002", "Participation des jeunes", "fr");
        b.abstract_text = "Une étude des mécanismes.".into();
        b.youth_led = YouthLed::Yes;
        b.doc_type = "Report".into();
        b.regions = vec![Region::Global];
        b.start_date = NaiveDate::from_ymd_opt(2019, 5, 1);
        b.alt_language_ids = vec!["YPS-001".into(), "YPS-002".into()];

        let mut c = entry("YPS-003", "Resolution 2250", "en");
        c.abstract_text = "Security Council resolution on youth, peace and security.".into();
        c.youth_led = YouthLed::NotApplicable;
        c.doc_type = "Resolution".into();
        c.regions = vec![Region::NotApplicable];
        c.start_date = NaiveDate::from_ymd_opt(2015, 12, 9);

        for e in [&mut a, &mut b, &mut c] {
            e.normalize();
        }
        catalog.replace_all(&[a, b, c]).await.expect("load");
        catalog
    }

    #[test]
    fn match_expr_escapes_user_input() {
        assert_eq!(
            fts_match_expr("youth peace", SearchScope::All).as_deref(),
            Some("alltext : (\"youth\" \"peace\")")
        );
        assert_eq!(
            fts_match_expr("say \"hi\"", SearchScope::Title).as_deref(),
            Some("title : (\"say\" \"\"\"hi\"\"\")")
        );
        assert_eq!(fts_match_expr("   ", SearchScope::All), None);
        assert_eq!(fts_match_expr("\"\"\" (((", SearchScope::All), None);
        // Operators end up inside phrases, not interpreted
        assert_eq!(
            fts_match_expr("a OR b", SearchScope::Abstract).as_deref(),
            Some("abstract : (\"a\" \"OR\" \"b\")")
        );
    }

    #[tokio::test]
    async fn text_query_matches_and_ranks() {
        let catalog = seeded().await;
        let results = catalog
            .search(&request("participation"), &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 2);
        assert_eq!(results.start_entry, 1);
        assert_eq!(results.end_entry, 2);
        let ids: Vec<&str> = results
            .hits
            .iter()
            .map(|h| h.entry.item_id.as_str())
            .collect();
        assert!(ids.contains(&"YPS-001"));
        assert!(ids.contains(&"YPS-002"));
    }

    #[tokio::test]
    async fn scope_restricts_matching() {
        let catalog = seeded().await;
        // "inclusion" appears only in the abstract of YPS-001
        let mut req = request("inclusion");
        req.scope = SearchScope::Title;
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 0);
        assert_eq!(results.start_entry, 0);
        assert_eq!(results.end_entry, 0);

        req.scope = SearchScope::Abstract;
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 1);
        assert_eq!(results.hits[0].entry.item_id, "YPS-001");
    }

    #[tokio::test]
    async fn facet_filters_are_conjunctive() {
        let catalog = seeded().await;
        let mut req = request("");
        req.youth_led = Some(YouthLed::Yes);
        req.language = Some("en".into());
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 1);
        assert_eq!(results.hits[0].entry.item_id, "YPS-001");

        let mut req = request("");
        req.region = Some(Region::Global);
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 2);

        let mut req = request("");
        req.year = Some(2015);
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 1);
        assert_eq!(results.hits[0].entry.item_id, "YPS-003");

        let mut req = request("");
        req.keyword = Some("mediation".into());
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 1);
        assert_eq!(results.hits[0].entry.item_id, "YPS-001");
    }

    #[tokio::test]
    async fn browse_defaults_to_newest_first() {
        let catalog = seeded().await;
        let results = catalog
            .search(&request(""), &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 3);
        let ids: Vec<&str> = results
            .hits
            .iter()
            .map(|h| h.entry.item_id.as_str())
            .collect();
        // 2019 entries first, id ASC within the tie, then 2015
        assert_eq!(ids, vec!["YPS-001", "YPS-002", "YPS-003"]);
    }

    #[tokio::test]
    async fn explicit_sorts() {
        let catalog = seeded().await;

        let mut req = request("");
        req.sort = SearchSort::DateAsc;
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.hits[0].entry.item_id, "YPS-003");

        // Explicit date-desc breaks date ties on id DESC.
        req.sort = SearchSort::DateDesc;
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        let ids: Vec<&str> = results
            .hits
            .iter()
            .map(|h| h.entry.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["YPS-002", "YPS-001", "YPS-003"]);

        req.sort = SearchSort::Alphabetical;
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        let titles: Vec<&str> = results
            .hits
            .iter()
            .map(|h| h.entry.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "Participation des jeunes",
                "Resolution 2250",
                "Youth Participation in Peace Processes",
            ]
        );
    }

    #[tokio::test]
    async fn pagination_math() {
        let catalog = test_catalog().await;
        let entries: Vec<Entry> = (1..=7)
            .map(|n| entry(&format!("YPS-{n:03}"), &format!("Title {n}"), "en"))
            .collect();
        catalog.replace_all(&entries).await.expect("load");

        let config = SearchConfig {
            entries_per_page: 3,
            ..SearchConfig::default()
        };
        let mut req = request("");
        req.page = 2;
        let results = catalog.search(&req, &config).await.expect("search");
        assert_eq!(results.total_entries, 7);
        assert_eq!(results.total_pages, 3);
        assert_eq!(results.start_entry, 4);
        assert_eq!(results.end_entry, 6);
        assert_eq!(results.hits.len(), 3);

        req.page = 3;
        let results = catalog.search(&req, &config).await.expect("search");
        assert_eq!(results.start_entry, 7);
        assert_eq!(results.end_entry, 7);
        assert_eq!(results.hits.len(), 1);
    }

    #[tokio::test]
    async fn youth_led_counts_follow_the_filters() {
        let catalog = seeded().await;
        let results = catalog
            .search(&request(""), &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(
            results.youth_led_counts,
            vec![(YouthLed::Yes, 2), (YouthLed::NotApplicable, 1)]
        );

        // An active youth-led filter narrows the counts too.
        let mut req = request("");
        req.youth_led = Some(YouthLed::NotApplicable);
        let results = catalog
            .search(&req, &SearchConfig::default())
            .await
            .expect("search");
        assert_eq!(results.total_entries, 1);
        assert_eq!(
            results.youth_led_counts,
            vec![(YouthLed::NotApplicable, 1)]
        );
    }

    #[tokio::test]
    async fn hits_carry_language_decoration() {
        let catalog = seeded().await;
        let results = catalog
            .search(&request("participation"), &SearchConfig::default())
            .await
            .expect("search");
        let hit = results
            .hits
            .iter()
            .find(|h| h.entry.item_id == "YPS-001")
            .expect("hit");
        assert_eq!(hit.language_name, "English");
        assert_eq!(hit.available_languages, vec!["English", "French"]);
    }

    #[tokio::test]
    async fn hostile_query_text_is_inert() {
        let catalog = seeded().await;
        for query in ["\"", "NEAR(", "title:*", "a AND", "((("] {
            let results = catalog
                .search(&request(query), &SearchConfig::default())
                .await
                .expect("hostile query must not error");
            let _ = results.total_entries;
        }
    }
}
