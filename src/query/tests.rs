use std::collections::HashSet;
use std::io::Write;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::NamedTempFile;

use super::*;
use crate::constants::DEFAULT_QUERIES;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_benchmark_empty_skips_round() {
    let source = BenchmarkQuerySource::from_items(Vec::new());

    assert!(source.is_empty());
    assert!(matches!(
        source.next_query(),
        Err(QuerySourceError::EmptyBenchmark)
    ));
}

#[test]
fn test_benchmark_query_carries_relevance_set() {
    let source = BenchmarkQuerySource::from_items(vec![BenchmarkItem {
        query: "What is the capital of France?".into(),
        relevant_docs: vec!["doc7".into()],
    }]);

    let round = source.next_query().unwrap();

    assert_eq!(round.query.as_str(), "What is the capital of France?");
    let relevant = round.relevant.expect("benchmark queries have ground truth");
    assert!(relevant.contains("doc7"));
    assert!(source.provides_ground_truth());
}

#[test]
fn test_benchmark_skips_blank_queries() {
    let source = BenchmarkQuerySource::from_items(vec![
        BenchmarkItem {
            query: "  ".into(),
            relevant_docs: vec!["doc1".into()],
        },
        BenchmarkItem {
            query: "real".into(),
            relevant_docs: vec![],
        },
    ]);

    assert_eq!(source.len(), 1);
}

#[test]
fn test_benchmark_from_path() {
    let file = write_temp(
        r#"[
            {"query": "q1", "relevant_docs": ["a", "b"]},
            {"query": "q2", "relevant_docs": ["c"]}
        ]"#,
    );

    let source = BenchmarkQuerySource::from_path(file.path()).unwrap();
    assert_eq!(source.len(), 2);
}

#[test]
fn test_benchmark_parse_error() {
    let file = write_temp("{not json");

    assert!(matches!(
        BenchmarkQuerySource::from_path(file.path()),
        Err(QuerySourceError::Parse { .. })
    ));
}

#[test]
fn test_benchmark_load_or_empty_on_missing_file() {
    let source = BenchmarkQuerySource::load_or_empty(std::path::Path::new("/nonexistent/b.json"));

    assert!(source.is_empty());
}

#[test]
fn test_benchmark_selection_covers_items_with_replacement() {
    let items = (0..3).map(|i| BenchmarkItem {
        query: format!("q{i}"),
        relevant_docs: vec![format!("d{i}")],
    });
    let source = BenchmarkQuerySource::from_items(items);
    let mut rng = StdRng::seed_from_u64(7);

    let drawn: Vec<String> = (0..60)
        .map(|_| {
            source
                .next_query_with(&mut rng)
                .unwrap()
                .query
                .into_string()
        })
        .collect();

    let distinct: HashSet<_> = drawn.iter().collect();
    assert_eq!(distinct.len(), 3);
    assert!(drawn.windows(2).any(|w| w[0] == w[1]));
}

#[test]
fn test_free_from_queries_requires_one() {
    assert!(matches!(
        FreeQuerySource::from_queries(Vec::<String>::new()),
        Err(QuerySourceError::NoQueries)
    ));
    assert!(matches!(
        FreeQuerySource::from_queries(["", "   "]),
        Err(QuerySourceError::NoQueries)
    ));
}

#[test]
fn test_free_from_path_ignores_blank_lines() {
    let file = write_temp("first query\n\n   \nsecond query\n");

    let source = FreeQuerySource::from_path(file.path()).unwrap();

    let queries: Vec<&str> = source.queries().iter().map(|q| q.as_str()).collect();
    assert_eq!(queries, vec!["first query", "second query"]);
}

#[test]
fn test_free_falls_back_when_missing() {
    let source = FreeQuerySource::load_or_default(std::path::Path::new("/nonexistent/q.txt"));

    assert_eq!(source.len(), DEFAULT_QUERIES.len());
}

#[test]
fn test_free_falls_back_when_empty() {
    let file = write_temp("\n\n");

    let source = FreeQuerySource::load_or_default(file.path());

    assert_eq!(source.len(), DEFAULT_QUERIES.len());
}

#[test]
fn test_free_query_has_no_ground_truth() {
    let source = FreeQuerySource::from_queries(["only"]).unwrap();

    let round = source.next_query().unwrap();

    assert_eq!(round.query.as_str(), "only");
    assert!(round.relevant.is_none());
    assert!(!source.provides_ground_truth());
}
