//! Query scoring end to end: parse, accumulate, rank, rewind.

use std::collections::HashMap;
use rsvcore::core::types::DocId;
use rsvcore::{QueryScorer, ScorerConfig, ScorerPool};

// ============================================================================
// Test Helpers
// ============================================================================

fn primary_keys(documents: usize) -> Vec<String> {
    (0..documents).map(|id| format!("DOC-{:06}", id)).collect()
}

/// Postings for a toy index: term → (document, impact)
fn postings() -> HashMap<&'static str, Vec<(usize, u16)>> {
    HashMap::from([
        ("arena", vec![(3, 4), (17, 2), (900, 7)]),
        ("heap", vec![(17, 5), (42, 1), (900, 1)]),
        ("accumulator", vec![(3, 1), (42, 6), (511, 2)]),
    ])
}

fn run_query(scorer: &mut QueryScorer<'_, u16>, query: &str) -> Vec<(usize, String, u16)> {
    let index = postings();
    scorer.rewind();
    scorer.parse(query).unwrap();

    let terms: Vec<(String, u32)> = scorer
        .terms()
        .iter()
        .map(|term| (term.text.to_string(), term.frequency))
        .collect();
    for (term, frequency) in terms {
        if let Some(list) = index.get(term.as_str()) {
            for &(document, impact) in list {
                scorer.add_rsv(document, impact * frequency as u16);
            }
        }
    }

    scorer
        .results()
        .map(|r| (r.document_id.value(), r.primary_key.to_string(), r.rsv))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_reference_scenario() {
    let keys = primary_keys(1024);
    let mut scorer = QueryScorer::<u16>::new(&keys, 1024, 3);
    scorer.add_rsv(5, 2);
    scorer.add_rsv(9, 5);
    scorer.add_rsv(5, 4);
    scorer.add_rsv(100, 1);

    let results: Vec<_> = scorer.results().map(|r| (r.document_id, r.rsv)).collect();
    assert_eq!(results, vec![(DocId(5), 6), (DocId(9), 5), (DocId(100), 1)]);
}

#[test]
fn test_queries_through_term_list() {
    let keys = primary_keys(1000);
    let mut scorer = QueryScorer::<u16>::new(&keys, 1000, 2);

    let results = run_query(&mut scorer, "Arena heap");
    assert_eq!(results, vec![
        (900, "DOC-000900".to_string(), 8),
        (17, "DOC-000017".to_string(), 7),
    ]);

    // Repeated terms weigh double
    let results = run_query(&mut scorer, "accumulator accumulator");
    assert_eq!(results, vec![
        (42, "DOC-000042".to_string(), 12),
        (511, "DOC-000511".to_string(), 4),
    ]);
}

#[test]
fn test_previous_query_does_not_leak() {
    let keys = primary_keys(1000);
    let mut scorer = QueryScorer::<u16>::new(&keys, 1000, 10);

    run_query(&mut scorer, "arena heap accumulator");
    let results = run_query(&mut scorer, "heap");
    let ids: Vec<usize> = results.iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids, vec![17, 42, 900]);
    assert_eq!(scorer.score(3), 0);
    assert_eq!(scorer.score(511), 0);
}

#[test]
fn test_lazy_clear_matches_full_clear() {
    let documents = 100_000;
    let keys = primary_keys(documents);
    let mut scorer = QueryScorer::<u32>::new(&keys, documents, 5);

    for id in (0..documents).step_by(7) {
        scorer.add_rsv(id, 3);
    }
    scorer.rewind();
    assert_eq!(scorer.accumulators().clean_blocks(), 0);

    scorer.add_rsv(14, 1);
    scorer.add_rsv(99_994, 2);
    for id in (0..documents).step_by(7) {
        let expected = match id {
            14 => 1,
            _ => 0,
        };
        assert_eq!(scorer.score(id), expected, "document {}", id);
    }
    assert_eq!(scorer.score(99_994), 2);
    assert_eq!(scorer.stats().blocks_cleaned, 2);
}

#[test]
fn test_rewind_cost_scales_with_blocks() {
    let documents = 1 << 20;
    let keys = primary_keys(documents);
    let scorer = QueryScorer::<u16>::new(&keys, documents, 10);
    let accumulators = scorer.accumulators();
    assert_eq!(accumulators.width(), 1024);
    assert_eq!(accumulators.blocks(), 1024);
}

#[test]
fn test_unbalanced_quote_surfaces() {
    let keys = primary_keys(10);
    let mut scorer = QueryScorer::<u16>::new(&keys, 10, 3);
    let err = scorer.parse("\"top k").unwrap_err();
    assert_eq!(err.kind, rsvcore::ErrorKind::Parse);
}

#[test]
fn test_pool_serves_worker_threads() {
    let documents = 10_000;
    let keys = primary_keys(documents);
    let pool = ScorerPool::<u32>::new(&keys, ScorerConfig::new(documents, 3), 4).unwrap();

    std::thread::scope(|s| {
        for worker in 0..4usize {
            let pool = &pool;
            s.spawn(move || {
                for round in 0..25usize {
                    let mut scorer = pool.checkout().unwrap();
                    let base = (worker * 1000 + round) % documents;
                    for offset in 0..50 {
                        scorer.add_rsv((base + offset * 13) % documents, (offset + 1) as u32);
                    }
                    let top: Vec<u32> = scorer.results().map(|r| r.rsv).collect();
                    assert_eq!(top, vec![50, 49, 48]);
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.checkouts, 100);
    assert_eq!(stats.returned + stats.discarded, 100);
}
