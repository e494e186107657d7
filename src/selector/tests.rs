use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

use crate::vectordb::Payload;

fn candidate(id: &str, score: f32) -> SearchMatch {
    SearchMatch::new(id, score, Payload::new())
}

fn candidate_with_fallback_score(id: &str, score: f64) -> SearchMatch {
    let mut payload = Payload::new();
    payload.insert("_score".to_string(), json!(score));
    SearchMatch {
        id: id.to_string(),
        score: 0.0,
        payload,
    }
}

#[test]
fn test_empty_candidates_yield_none() {
    for strategy in [
        SelectionStrategy::First,
        SelectionStrategy::HighestScore,
        SelectionStrategy::TemperatureSoftmax {
            temperature: 0.7,
            top_k: 5,
        },
    ] {
        let selector = ResultSelector::new(strategy).expect("should be valid");
        assert!(selector.select(&[]).is_none(), "{}", strategy.name());
    }
}

#[test]
fn test_first_returns_backend_order() {
    let selector = ResultSelector::new(SelectionStrategy::First).unwrap();
    let candidates = vec![candidate("a", 0.2), candidate("b", 0.9)];
    assert_eq!(selector.select(&candidates).map(|c| c.id.as_str()), Some("a"));
}

#[test]
fn test_highest_score_is_order_invariant() {
    let selector = ResultSelector::default();
    let mut candidates = vec![
        candidate("low", 0.71),
        candidate("best", 0.95),
        candidate("mid", 0.80),
    ];

    assert_eq!(selector.select(&candidates).map(|c| c.id.as_str()), Some("best"));
    candidates.reverse();
    assert_eq!(selector.select(&candidates).map(|c| c.id.as_str()), Some("best"));
    candidates.rotate_left(1);
    assert_eq!(selector.select(&candidates).map(|c| c.id.as_str()), Some("best"));
}

#[test]
fn test_highest_score_tie_keeps_first_occurrence() {
    let selector = ResultSelector::default();
    let candidates = vec![candidate("first", 0.9), candidate("second", 0.9)];
    assert_eq!(
        selector.select(&candidates).map(|c| c.id.as_str()),
        Some("first")
    );
}

#[test]
fn test_candidate_score_fallbacks() {
    assert!((candidate_score(&candidate("a", 0.8)) - 0.8).abs() < 1e-6);
    assert!((candidate_score(&candidate_with_fallback_score("b", 0.6)) - 0.6).abs() < 1e-6);

    let bare = SearchMatch {
        id: "c".to_string(),
        score: 0.99,
        payload: Payload::new(),
    };
    assert_eq!(candidate_score(&bare), 0.0);
}

#[test]
fn test_highest_score_reads_fallback_key() {
    let selector = ResultSelector::default();
    let candidates = vec![
        candidate_with_fallback_score("a", 0.4),
        candidate_with_fallback_score("b", 0.7),
    ];
    assert_eq!(selector.select(&candidates).map(|c| c.id.as_str()), Some("b"));
}

#[test]
fn test_highest_score_single_candidate_returned() {
    let candidates = vec![candidate("only", 0.42)];
    assert_eq!(
        ResultSelector::default().select(&candidates).map(|m| m.id.as_str()),
        Some("only")
    );
}

#[test]
fn test_default_strategy_is_highest_score() {
    assert_eq!(SelectionStrategy::default(), SelectionStrategy::HighestScore);
}

#[test]
fn test_softmax_single_candidate_always_returned() {
    let selector = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 2.0,
        top_k: 5,
    })
    .unwrap();
    let candidates = vec![candidate("only", 0.75)];
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..20 {
        assert_eq!(
            selector
                .select_with_rng(&candidates, &mut rng)
                .map(|c| c.id.as_str()),
            Some("only")
        );
    }
}

#[test]
fn test_softmax_low_temperature_converges_to_best() {
    let selector = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 0.01,
        top_k: 5,
    })
    .unwrap();
    let candidates = vec![candidate("ok", 0.60), candidate("best", 0.95)];
    let mut rng = StdRng::seed_from_u64(42);

    let best_count = (0..100)
        .filter(|_| {
            selector
                .select_with_rng(&candidates, &mut rng)
                .map(|c| c.id == "best")
                .unwrap_or(false)
        })
        .count();

    assert!(best_count >= 95, "best picked {} times out of 100", best_count);
}

#[test]
fn test_softmax_high_temperature_explores() {
    let selector = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 100.0,
        top_k: 5,
    })
    .unwrap();
    let candidates = vec![candidate("a", 0.80), candidate("b", 0.79)];
    let mut rng = StdRng::seed_from_u64(1);

    let picks: Vec<&str> = (0..200)
        .filter_map(|_| selector.select_with_rng(&candidates, &mut rng))
        .map(|c| c.id.as_str())
        .collect();

    assert!(picks.contains(&"a"));
    assert!(picks.contains(&"b"));
}

#[test]
fn test_softmax_respects_top_k() {
    let selector = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 50.0,
        top_k: 2,
    })
    .unwrap();
    let candidates = vec![
        candidate("third", 0.70),
        candidate("first", 0.90),
        candidate("second", 0.85),
    ];
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..200 {
        let picked = selector
            .select_with_rng(&candidates, &mut rng)
            .expect("should pick");
        assert_ne!(picked.id, "third");
    }
}

#[test]
fn test_validate_rejects_bad_softmax_params() {
    let err = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 0.0,
        top_k: 5,
    })
    .unwrap_err();
    assert_eq!(err, SelectorError::InvalidTemperature { value: 0.0 });

    assert!(
        SelectionStrategy::TemperatureSoftmax {
            temperature: f32::NAN,
            top_k: 5
        }
        .validate()
        .is_err()
    );

    let err = ResultSelector::new(SelectionStrategy::TemperatureSoftmax {
        temperature: 0.5,
        top_k: 0,
    })
    .unwrap_err();
    assert_eq!(err, SelectorError::InvalidTopK);
}

#[test]
fn test_from_name_resolution() {
    assert_eq!(
        SelectionStrategy::from_name("", 0.7, 5),
        SelectionStrategy::HighestScore
    );
    assert_eq!(
        SelectionStrategy::from_name("first", 0.7, 5),
        SelectionStrategy::First
    );
    assert_eq!(
        SelectionStrategy::from_name("round_robin", 0.7, 5),
        SelectionStrategy::First
    );
    assert_eq!(
        SelectionStrategy::from_name("temperature_softmax", 0.0, 0),
        SelectionStrategy::TemperatureSoftmax {
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_SOFTMAX_TOP_K
        }
    );
    assert_eq!(
        SelectionStrategy::from_name(" Temperature_Softmax ", 1.5, 3),
        SelectionStrategy::TemperatureSoftmax {
            temperature: 1.5,
            top_k: 3
        }
    );
}
