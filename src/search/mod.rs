//! In-memory search index over element views
//!
//! - `build_index` walks the flat view list once and fills four lookup
//!   tables: name, type, path (injective) and attribute
//! - `search` ranks case-insensitive matches: exact name beats name
//!   prefix, prefix beats substring, then type label, then path
//! - lookups return element ids; callers resolve ids against the views

use crate::convert::ElementView;
use serde::Serialize;
use std::collections::HashMap;

const SCORE_NAME_EXACT: u32 = 100;
const SCORE_NAME_PREFIX: u32 = 75;
const SCORE_NAME_SUBSTRING: u32 = 50;
const SCORE_TYPE: u32 = 30;
const SCORE_PATH: u32 = 20;

/// One ranked match from [`SearchIndex::search`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub path: String,
    pub score: u32,
    /// Which field matched: "name", "type" or "path"
    pub field: &'static str,
    /// Byte range of the match inside the matched field
    pub range: (usize, usize),
}

#[derive(Debug, Clone)]
struct IndexEntry {
    id: String,
    name: String,
    name_lower: String,
    type_label: &'static str,
    path: String,
    path_lower: String,
}

/// Lookup tables over a parsed document's element views
#[derive(Debug, Default)]
pub struct SearchIndex {
    name_index: HashMap<String, Vec<String>>,
    type_index: HashMap<String, Vec<String>>,
    /// Paths are unique per document, so this maps one-to-one
    path_index: HashMap<String, String>,
    attribute_index: HashMap<(String, String), Vec<String>>,
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all elements with the given tag name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> &[String] {
        self.name_index
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids of all elements of the given type label (case-insensitive)
    pub fn find_by_type(&self, label: &str) -> &[String] {
        self.type_index
            .get(&label.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Id of the element at an exact tree path, if any
    pub fn find_by_path(&self, path: &str) -> Option<&str> {
        self.path_index.get(path).map(String::as_str)
    }

    /// Ids of all elements carrying an attribute with this exact value
    ///
    /// The attribute name is matched case-insensitively, the value exactly.
    pub fn find_by_attribute(&self, name: &str, value: &str) -> &[String] {
        self.attribute_index
            .get(&(name.to_lowercase(), value.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rank elements against a free-text term
    ///
    /// Returns hits sorted by descending score, ties broken by document
    /// order. A blank term matches nothing.
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, SearchHit)> = Vec::new();
        for (order, entry) in self.entries.iter().enumerate() {
            if let Some(hit) = entry.match_term(&needle) {
                hits.push((order, hit));
            }
        }
        hits.sort_by(|(ao, a), (bo, b)| b.score.cmp(&a.score).then(ao.cmp(bo)));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

impl IndexEntry {
    fn match_term(&self, needle: &str) -> Option<SearchHit> {
        if let Some(pos) = self.name_lower.find(needle) {
            let score = if self.name_lower == needle {
                SCORE_NAME_EXACT
            } else if pos == 0 {
                SCORE_NAME_PREFIX
            } else {
                SCORE_NAME_SUBSTRING
            };
            return Some(self.hit(score, "name", pos, needle.len()));
        }
        if self.type_label.to_lowercase().contains(needle) {
            let pos = self.type_label.to_lowercase().find(needle).unwrap_or(0);
            return Some(self.hit(SCORE_TYPE, "type", pos, needle.len()));
        }
        if let Some(pos) = self.path_lower.find(needle) {
            return Some(self.hit(SCORE_PATH, "path", pos, needle.len()));
        }
        None
    }

    fn hit(&self, score: u32, field: &'static str, pos: usize, len: usize) -> SearchHit {
        SearchHit {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            score,
            field,
            range: (pos, pos + len),
        }
    }
}

/// Build the search index from a flat view list in one pass
pub fn build_index(views: &[ElementView]) -> SearchIndex {
    let mut index = SearchIndex::default();

    for view in views {
        let name_lower = view.name.to_lowercase();
        index
            .name_index
            .entry(name_lower.clone())
            .or_default()
            .push(view.id.clone());
        index
            .type_index
            .entry(view.element_type.label().to_lowercase())
            .or_default()
            .push(view.id.clone());
        index.path_index.insert(view.path.clone(), view.id.clone());
        for (attr_name, attr_value) in &view.attributes {
            index
                .attribute_index
                .entry((attr_name.to_lowercase(), attr_value.clone()))
                .or_default()
                .push(view.id.clone());
        }
        index.entries.push(IndexEntry {
            id: view.id.clone(),
            name: view.name.clone(),
            name_lower,
            type_label: view.element_type.label(),
            path: view.path.clone(),
            path_lower: view.path.to_lowercase(),
        });
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::to_element_views;
    use crate::tree::build_tree;

    fn index_of(text: &str) -> SearchIndex {
        let nodes = build_tree(text).unwrap();
        build_index(&to_element_views(&nodes))
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let index = index_of("<AUTOSAR><AR-PACKAGE/><AR-PACKAGE/></AUTOSAR>");
        assert_eq!(index.find_by_name("ar-package").len(), 2);
        assert_eq!(index.find_by_name("AR-PACKAGE").len(), 2);
        assert!(index.find_by_name("missing").is_empty());
    }

    #[test]
    fn test_path_index_is_injective() {
        let index = index_of("<r><x><n>a</n></x><x><n>b</n></x></r>");
        assert_eq!(index.path_index.len(), index.len());
        assert!(index.find_by_path("r/x[0]/n").is_some());
        assert!(index.find_by_path("r/x[1]/n").is_some());
    }

    #[test]
    fn test_find_by_attribute() {
        let index = index_of("<r><a UUID=\"u-1\"/><b uuid=\"u-1\"/><c UUID=\"u-2\"/></r>");
        assert_eq!(index.find_by_attribute("uuid", "u-1").len(), 2);
        assert_eq!(index.find_by_attribute("UUID", "u-2").len(), 1);
        assert!(index.find_by_attribute("uuid", "u-3").is_empty());
    }

    #[test]
    fn test_search_ranking() {
        let index = index_of("<root><port/><portal/><support/></root>");
        let hits = index.search("port");
        assert!(hits.len() >= 3);
        assert_eq!(hits[0].name, "port");
        assert_eq!(hits[0].score, SCORE_NAME_EXACT);
        assert_eq!(hits[1].name, "portal");
        assert_eq!(hits[1].score, SCORE_NAME_PREFIX);
        assert_eq!(hits[2].name, "support");
        assert_eq!(hits[2].score, SCORE_NAME_SUBSTRING);
    }

    #[test]
    fn test_search_type_and_path_fallbacks() {
        let index = index_of("<AUTOSAR><SW-COMPONENT-PROTOTYPE/></AUTOSAR>");
        let hits = index.search("component");
        // tag name substring outranks the type-label match
        assert_eq!(hits[0].field, "name");

        let hits = index.search("autosar/sw");
        assert!(hits.iter().all(|h| h.field == "path"));
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_search_blank_term() {
        let index = index_of("<a><b/></a>");
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_search_match_range() {
        let index = index_of("<wrapper/>");
        let hits = index.search("rap");
        assert_eq!(hits[0].range, (1, 4));
    }
}
