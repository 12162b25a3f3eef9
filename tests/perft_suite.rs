//! Runs the bundled perft suite file through the suite harness.

use chess_core::perft::{parse_suite, DEFAULT_DEPTH_CAP};

const SUITE: &str = include_str!("data/perftsuite.epd");

#[test]
fn test_suite_parses() {
    let positions = parse_suite(SUITE).expect("suite file is well-formed");
    assert_eq!(positions.len(), 9);
    assert!(positions.iter().all(|p| !p.expected.is_empty()));
}

#[test]
fn test_suite_counts_match() {
    let positions = parse_suite(SUITE).expect("suite file is well-formed");

    for position in &positions {
        let results = position
            .run(DEFAULT_DEPTH_CAP)
            .unwrap_or_else(|err| panic!("perft run failed: {err}"));
        assert!(!results.is_empty(), "no depths at or below the cap");

        for result in results {
            assert!(
                result.passed(),
                "{} depth {}: expected {}, got {}",
                position.fen,
                result.depth,
                result.expected,
                result.actual
            );
        }
    }
}
