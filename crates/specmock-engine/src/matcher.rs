//! Concrete path to template matching.

use indexmap::IndexMap;
use specmock_core::{Document, PathTemplate};
use tracing::trace;

/// Result of matching a concrete path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathMatch {
    /// Template string as stored in the document.
    pub template: String,
    /// Variable bindings in template order.
    pub params: IndexMap<String, String>,
}

/// Matches concrete paths against every template of a document.
///
/// Candidates are kept ordered by specificity so the first hit wins:
/// fewest variable segments first, then template string order.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    templates: Vec<PathTemplate>,
}

impl PathMatcher {
    pub fn new(document: &Document) -> Self {
        Self::from_templates(document.paths().values().map(|item| item.template.clone()))
    }

    pub fn from_templates(templates: impl IntoIterator<Item = PathTemplate>) -> Self {
        let mut templates: Vec<PathTemplate> = templates.into_iter().collect();
        templates.sort_by(|a, b| {
            a.variable_count()
                .cmp(&b.variable_count())
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        Self { templates }
    }

    /// Find the most specific template for `concrete`. Anything after `?`
    /// is ignored.
    pub fn matches(&self, concrete: &str) -> Option<PathMatch> {
        let path = concrete.split_once('?').map_or(concrete, |(path, _)| path);

        let found = self.templates.iter().find_map(|template| {
            template.match_path(path).map(|params| PathMatch {
                template: template.as_str().to_string(),
                params,
            })
        });
        trace!(path = %path, matched = ?found.as_ref().map(|m| &m.template), "Matched path");
        found
    }

    pub fn templates(&self) -> &[PathTemplate] {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher(templates: &[&str]) -> PathMatcher {
        PathMatcher::from_templates(templates.iter().map(|t| PathTemplate::parse(t).unwrap()))
    }

    #[test]
    fn test_binds_variable() {
        let matcher = matcher(&["/items/{id}"]);
        let found = matcher.matches("/items/7").unwrap();

        assert_eq!(found.template, "/items/{id}");
        assert_eq!(found.params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_literal_preferred_over_variable() {
        let matcher = matcher(&["/items/{id}", "/items/latest"]);

        assert_eq!(matcher.matches("/items/latest").unwrap().template, "/items/latest");
        assert_eq!(matcher.matches("/items/8").unwrap().template, "/items/{id}");
    }

    #[test]
    fn test_tie_break_is_lexicographic() {
        let matcher = matcher(&["/{b}/x", "/{a}/x"]);
        let found = matcher.matches("/q/x").unwrap();

        assert_eq!(found.template, "/{a}/x");
        assert_eq!(found.params.get("a").map(String::as_str), Some("q"));
    }

    #[test]
    fn test_segment_count_must_match() {
        let matcher = matcher(&["/items/{id}"]);
        assert!(matcher.matches("/items").is_none());
        assert!(matcher.matches("/items/1/extra").is_none());
        assert!(matcher.matches("/items/").is_none());
    }

    #[test]
    fn test_query_string_ignored() {
        let matcher = matcher(&["/items/{id}"]);
        let found = matcher.matches("/items/3?verbose=true").unwrap();
        assert_eq!(found.params.get("id").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_prefix_and_suffix_segments() {
        let matcher = matcher(&["/files/{name}.json"]);
        let found = matcher.matches("/files/report.json").unwrap();
        assert_eq!(found.params.get("name").map(String::as_str), Some("report"));
        assert!(matcher.matches("/files/report.xml").is_none());
    }
}
