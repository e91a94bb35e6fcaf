//! Substring scoring over the index.
//!
//! Each query term contributes 3 for a title match, 2 for a description
//! match and 1 for a body match, all case-insensitive and summed. There is
//! no stemming and no fuzzy matching; ordering is fully determined by the
//! scores and the index order.

use super::{SearchHit, SearchRecord, SearchResponse};
use std::time::Instant;

const TITLE_WEIGHT: u32 = 3;
const DESCRIPTION_WEIGHT: u32 = 2;
const CONTENT_WEIGHT: u32 = 1;

/// Lowercased whitespace-separated terms of a query.
pub fn terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Score one record against already-lowercased terms.
pub fn score(record: &SearchRecord, terms: &[String]) -> u32 {
    let title = record.title.to_lowercase();
    let description = record.description.to_lowercase();
    let content = record.content.to_lowercase();

    terms
        .iter()
        .map(|term| {
            let mut s = 0;
            if title.contains(term.as_str()) {
                s += TITLE_WEIGHT;
            }
            if description.contains(term.as_str()) {
                s += DESCRIPTION_WEIGHT;
            }
            if content.contains(term.as_str()) {
                s += CONTENT_WEIGHT;
            }
            s
        })
        .sum()
}

/// Rank records for a query.
///
/// Hits are sorted by descending score (ties keep index order), cut to
/// `max_results`, and only then filtered to `locale`. A locale-filtered
/// response can therefore hold fewer than `max_results` hits even when more
/// matches exist.
pub fn search_records(
    query: &str,
    records: &[SearchRecord],
    max_results: usize,
    locale: Option<&str>,
) -> SearchResponse {
    let started = Instant::now();
    let terms = terms(query);
    if terms.is_empty() {
        return SearchResponse::default();
    }

    let mut hits: Vec<SearchHit> = records
        .iter()
        .filter_map(|record| {
            let score = score(record, &terms);
            (score > 0).then(|| SearchHit {
                record: record.clone(),
                score,
            })
        })
        .collect();
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(max_results);

    if let Some(locale) = locale {
        hits.retain(|hit| hit.record.locale == locale);
    }

    SearchResponse {
        count: hits.len(),
        hits,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::record;

    fn titles(response: &SearchResponse) -> Vec<&str> {
        response
            .hits
            .iter()
            .map(|h| h.record.title.as_str())
            .collect()
    }

    #[test]
    fn title_match_scores_three() {
        let r = record("foo bar", "", "", "en");
        assert_eq!(score(&r, &terms("foo")), 3);
    }

    #[test]
    fn body_only_match_scores_one() {
        let r = record("other", "", "has foo inside", "en");
        assert_eq!(score(&r, &terms("foo")), 1);
    }

    #[test]
    fn fields_and_terms_add_up() {
        let r = record("Ticket setup", "ticket panel", "open a ticket", "en");
        // ticket: 3 + 2 + 1, setup: 3
        assert_eq!(score(&r, &terms("TICKET setup")), 9);
    }

    #[test]
    fn body_match_lifts_a_title_match() {
        // Both match the title; only the second also matches the body
        let records = vec![
            record("foo guide", "", "unrelated", "en"),
            record("foo tour", "", "more foo here", "en"),
        ];
        let res = search_records("foo", &records, 20, None);
        assert_eq!(titles(&res), vec!["foo tour", "foo guide"]);
        assert_eq!(res.hits[0].score, 4);
        assert_eq!(res.hits[1].score, 3);
    }

    #[test]
    fn zero_scores_are_excluded() {
        let records = vec![record("foo", "", "", "en"), record("bar", "", "", "en")];
        let res = search_records("foo", &records, 20, None);
        assert_eq!(titles(&res), vec!["foo"]);
        assert_eq!(res.count, 1);
    }

    #[test]
    fn higher_score_first() {
        let records = vec![
            record("a", "", "x", "en"),       // 1
            record("x", "x", "", "en"),       // 5
            record("b", "x", "", "en"),       // 2
        ];
        let res = search_records("x", &records, 20, None);
        assert_eq!(titles(&res), vec!["x", "b", "a"]);
        assert_eq!(res.hits[0].score, 5);
    }

    #[test]
    fn ties_keep_index_order() {
        let records = vec![record("x one", "", "", "en"), record("x two", "", "", "fa")];
        let res = search_records("x", &records, 20, None);
        assert_eq!(titles(&res), vec!["x one", "x two"]);
    }

    #[test]
    fn blank_query_is_empty() {
        let records = vec![record("foo", "", "", "en")];
        let res = search_records("   \t", &records, 20, None);
        assert_eq!(res, SearchResponse::default());
    }

    #[test]
    fn truncates_to_max_results() {
        let records: Vec<_> = (0..30)
            .map(|i| record(&format!("doc {i}"), "", "", "en"))
            .collect();
        let res = search_records("doc", &records, 20, None);
        assert_eq!(res.count, 20);
    }

    #[test]
    fn locale_filter_applies_after_truncation() {
        let mut records: Vec<_> = (0..3)
            .map(|i| record(&format!("foo {i}"), "", "", "en"))
            .collect();
        records.push(record("foo fa", "", "", "fa"));
        let res = search_records("foo", &records, 3, Some("fa"));
        assert!(res.hits.is_empty());

        let res = search_records("foo", &records, 4, Some("fa"));
        assert_eq!(titles(&res), vec!["foo fa"]);
    }

    #[test]
    fn hit_serializes_flat() {
        let hit = SearchHit {
            record: record("foo", "d", "c", "en"),
            score: 3,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["title"], "foo");
        assert_eq!(json["score"], 3);
        assert!(json.get("record").is_none());
    }
}
