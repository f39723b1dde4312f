//! Hierarchical name search over administrative units.
//!
//! Every feature names up to five nested units (province, district, sector,
//! cell, village). The index flattens those names into one [`SearchEntry`]
//! per distinct unit, where a unit is identified by its level, its
//! normalized name, *and* the normalized names of all its ancestors. Sibling
//! units across the country routinely share names, so the ancestor chain is
//! part of the identity: two cells called "Kigali" in different sectors are
//! two entries, each aggregating only its own features.
//!
//! # Ranking
//!
//! Matches are ordered by
//!
//! 1. names starting with the query before the rest (only when a query is given),
//! 2. hierarchy level, province first,
//! 3. number of aggregated features, fewest first,
//!
//! and truncated to [`SearchConfig::max_results`]. Ties keep build order.
//!
//! # Examples
//!
//! ```
//! use geo::polygon;
//! use imbibi::{Feature, Level, SearchIndex};
//!
//! let cell = |sector: &str| {
//!     Feature::new(
//!         polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
//!         [("NAME_1", "P"), ("NAME_2", "X"), ("NAME_3", sector), ("NAME_4", "Kigali")],
//!     )
//! };
//! let index = SearchIndex::new(&[cell("A"), cell("B")]);
//!
//! let results = index.find("kigali", None);
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|entry| entry.level == Level::Cell));
//! assert_eq!(results.entries()[0].parent_label, "P • X • A");
//! ```

use crate::config::SearchConfig;
use crate::query::{self, ParsedQuery};
use crate::text::normalize;
use crate::types::{Feature, Level, UNKNOWN};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::time::Instant;

/// Separator between ancestor names in [`SearchEntry::parent_label`].
pub const PARENT_SEPARATOR: &str = " • ";

/// One distinct administrative unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    /// Stable identity: `<level>:<normalized name>:<normalized ancestors joined by '>'>`.
    /// `%`, `:` and `>` inside a name are percent-encoded.
    pub key: String,
    /// Hierarchy level of the unit
    pub level: Level,
    /// Name as first seen, trimmed
    pub name: String,
    /// Ancestor breadcrumb, e.g. `"Kigali City • Gasabo • Remera"`
    pub parent_label: String,
    /// Folded name and ancestors joined by [`PARENT_SEPARATOR`], used for
    /// substring matching
    pub search_text: String,
    /// Positions of the aggregated features, in input order
    pub indices: Vec<usize>,
    #[serde(skip)]
    normalized_name: String,
}

impl SearchEntry {
    /// Number of features this unit aggregates.
    pub fn feature_count(&self) -> usize {
        self.indices.len()
    }

    /// Whether an already normalized query occurs in the unit's own name.
    /// An empty query matches every name.
    pub fn is_name_match(&self, normalized_query: &str) -> bool {
        self.normalized_name.contains(normalized_query)
    }
}

/// Deduplicated catalogue of named units with ranked substring search.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
    by_key: FxHashMap<String, usize>,
    config: SearchConfig,
}

impl SearchIndex {
    /// Builds the catalogue with default search settings.
    pub fn new(features: &[Feature]) -> Self {
        Self::with_config(features, SearchConfig::default())
    }

    /// Builds the catalogue with explicit search settings.
    pub fn with_config(features: &[Feature], config: SearchConfig) -> Self {
        let started = Instant::now();
        let mut index = Self {
            entries: Vec::new(),
            by_key: FxHashMap::default(),
            config,
        };

        for (idx, feature) in features.iter().enumerate() {
            for level in Level::ALL {
                index.register(idx, feature, level);
            }
        }

        log::debug!(
            "search index: {} entries from {} features, built in {:?}",
            index.entries.len(),
            features.len(),
            started.elapsed()
        );
        index
    }

    fn register(&mut self, idx: usize, feature: &Feature, level: Level) {
        let Some(name) = feature.name(level) else {
            return;
        };
        let normalized_name = normalize(name);
        if normalized_name.is_empty() {
            return;
        }

        let ancestors: Vec<&str> = level
            .ancestors()
            .iter()
            .map(|ancestor| feature.name(*ancestor).unwrap_or(UNKNOWN))
            .collect();
        let folded_ancestors: Vec<String> = ancestors.iter().map(|a| normalize(a)).collect();
        let parent_key = folded_ancestors
            .iter()
            .map(|ancestor| key_component(ancestor))
            .collect::<Vec<_>>()
            .join(">");
        let key = format!(
            "{}:{}:{}",
            level.keyword(),
            key_component(&normalized_name),
            parent_key
        );

        if let Some(&position) = self.by_key.get(&key) {
            self.entries[position].indices.push(idx);
            return;
        }

        // Folded parts stay apart, so a query never spans two labels
        let search_text = std::iter::once(normalized_name.as_str())
            .chain(folded_ancestors.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(PARENT_SEPARATOR);

        self.by_key.insert(key.clone(), self.entries.len());
        self.entries.push(SearchEntry {
            key,
            level,
            name: name.to_string(),
            parent_label: ancestors.join(PARENT_SEPARATOR),
            search_text,
            indices: vec![idx],
            normalized_name,
        });
    }

    /// Runs a raw query, honouring the `:level` shorthand.
    ///
    /// A keyword in the query takes precedence over `level`. A partial or
    /// unknown keyword returns level suggestions instead of results.
    pub fn search(&self, input: &str, level: Option<Level>) -> SearchOutcome<'_> {
        match query::parse(input) {
            ParsedQuery::Text(text) => SearchOutcome::Results(self.find(text, level)),
            ParsedQuery::Filtered { level, text } => {
                SearchOutcome::Results(self.find(text, Some(level)))
            }
            ParsedQuery::Suggest(levels) => SearchOutcome::Suggestions(levels),
        }
    }

    /// Ranked substring search without shorthand parsing.
    ///
    /// Queries shorter than [`SearchConfig::min_query_chars`] after folding
    /// are treated as absent: without a level filter they return nothing, with
    /// one they return every unit at that level.
    pub fn find(&self, query: &str, level: Option<Level>) -> SearchResults<'_> {
        let needle = normalize(query);
        let has_text = needle.chars().count() >= self.config.min_query_chars;
        if !has_text && level.is_none() {
            return SearchResults::default();
        }
        let needle = if has_text { needle } else { String::new() };

        let mut hits: Vec<&SearchEntry> = self
            .entries
            .iter()
            .filter(|entry| level.map_or(true, |level| entry.level == level))
            .filter(|entry| !has_text || entry.search_text.contains(&needle))
            .collect();

        hits.sort_by(|a, b| rank(a, b, &needle));
        hits.truncate(self.config.max_results);

        log::trace!(
            "search {:?} (level {:?}) -> {} hits",
            needle,
            level,
            hits.len()
        );
        SearchResults {
            query: needle,
            entries: hits,
        }
    }

    /// Looks up an entry by its [`key`](SearchEntry::key), e.g. to restore a
    /// selection saved in a URL.
    pub fn entry(&self, key: &str) -> Option<&SearchEntry> {
        self.by_key.get(key).map(|&position| &self.entries[position])
    }

    /// All entries in build order.
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Number of distinct units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no feature carried any name.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Escapes key delimiters so distinct units never share a key.
fn key_component(text: &str) -> Cow<'_, str> {
    if !text.contains(['%', ':', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        match ch {
            '%' => escaped.push_str("%25"),
            ':' => escaped.push_str("%3A"),
            '>' => escaped.push_str("%3E"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

fn rank(a: &SearchEntry, b: &SearchEntry, needle: &str) -> Ordering {
    let prefix = if needle.is_empty() {
        Ordering::Equal
    } else {
        b.normalized_name
            .starts_with(needle)
            .cmp(&a.normalized_name.starts_with(needle))
    };
    prefix
        .then(a.level.cmp(&b.level))
        .then(a.indices.len().cmp(&b.indices.len()))
}

/// Ranked matches for one query.
#[derive(Debug, Clone, Default)]
pub struct SearchResults<'a> {
    query: String,
    entries: Vec<&'a SearchEntry>,
}

impl<'a> SearchResults<'a> {
    /// The folded query text; empty when no text filter applied.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Matches in rank order.
    pub fn entries(&self) -> &[&'a SearchEntry] {
        &self.entries
    }

    /// Iterates matches in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &'a SearchEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Matches whose own name contains the query, in rank order.
    pub fn name_matches(&self) -> impl Iterator<Item = &'a SearchEntry> + '_ {
        self.iter().filter(move |entry| entry.is_name_match(&self.query))
    }

    /// Matches where the query occurs only among the ancestors, in rank order.
    pub fn parent_matches(&self) -> impl Iterator<Item = &'a SearchEntry> + '_ {
        self.iter().filter(move |entry| !entry.is_name_match(&self.query))
    }

    /// Number of matches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`SearchIndex::search`].
#[derive(Debug, Clone)]
pub enum SearchOutcome<'a> {
    /// The query ran; possibly with no matches
    Results(SearchResults<'a>),
    /// The query held an incomplete level keyword; these levels complete it
    Suggestions(Vec<Level>),
}

impl<'a> SearchOutcome<'a> {
    /// The results, if the query ran.
    pub fn results(&self) -> Option<&SearchResults<'a>> {
        match self {
            SearchOutcome::Results(results) => Some(results),
            SearchOutcome::Suggestions(_) => None,
        }
    }

    /// The level suggestions; empty when the query ran.
    pub fn suggestions(&self) -> &[Level] {
        match self {
            SearchOutcome::Results(_) => &[],
            SearchOutcome::Suggestions(levels) => levels,
        }
    }

    /// Matching entries, or nothing when suggestions were returned.
    pub fn into_entries(self) -> Vec<&'a SearchEntry> {
        match self {
            SearchOutcome::Results(results) => results.entries,
            SearchOutcome::Suggestions(_) => Vec::new(),
        }
    }
}
