use approx::assert_relative_eq;
use hand_coach::cards::{parse_board, parse_card, Card};
use hand_coach::equity::*;
use hand_coach::hand::Position;
use hand_coach::range::Range;

fn hero(c1: &str, c2: &str) -> [Card; 2] {
    [parse_card(c1).unwrap(), parse_card(c2).unwrap()]
}

#[test]
fn test_pot_odds_even_money() {
    assert_relative_eq!(pot_odds(10.0, 10.0).unwrap(), 0.5);
}

#[test]
fn test_pot_odds_half_pot() {
    assert_relative_eq!(pot_odds(100.0, 50.0).unwrap(), 1.0 / 3.0);
}

#[test]
fn test_pot_odds_invalid() {
    assert!(pot_odds(0.0, 50.0).is_err());
    assert!(pot_odds(100.0, -1.0).is_err());
}

#[test]
fn test_call_decision_threshold() {
    let profitable = call_decision(0.51, 10.0, 10.0).unwrap();
    assert!(profitable.profitable);
    // Exactly at the price is not profitable.
    let breakeven = call_decision(0.5, 10.0, 10.0).unwrap();
    assert!(!breakeven.profitable);
}

#[test]
fn test_heuristic_bounds() {
    let board = parse_board("AhKd7c").unwrap();
    // Pair + matching board rank + high rank-sum stacks every bonus; the
    // ceiling still caps it.
    let strong = heuristic_equity(&hero("As", "Ad"), &board);
    assert!(strong <= 0.90);
    let weak = heuristic_equity(&hero("3s", "2d"), &[]);
    assert!(weak >= 0.10);
}

#[test]
fn test_heuristic_constants() {
    // Base only: no pair, offsuit, low rank-sum, empty board.
    assert!((heuristic_equity(&hero("8s", "3d"), &[]) - 0.40).abs() < 1e-9);
    // Pocket pair adds 0.15.
    assert!((heuristic_equity(&hero("8s", "8d"), &[]) - 0.55).abs() < 1e-9);
    // Suited adds 0.03.
    assert!((heuristic_equity(&hero("8s", "3s"), &[]) - 0.43).abs() < 1e-9);
    // Rank sum >= 24 adds 0.10.
    assert!((heuristic_equity(&hero("Ks", "Jd"), &[]) - 0.50).abs() < 1e-9);
}

#[test]
fn test_heuristic_board_match_bonus() {
    let board = parse_board("9h5d2c").unwrap();
    let with_match = heuristic_equity(&hero("9s", "4d"), &board);
    let without = heuristic_equity(&hero("8s", "4d"), &board);
    assert!((with_match - without - 0.20).abs() < 1e-9);
}

#[test]
fn test_estimate_dominating_hand() {
    let villain = Range::opening(Position::Btn).unwrap();
    let board = parse_board("Ah7d2c").unwrap();
    let result = estimate(&hero("As", "Ad"), &villain, &board);
    assert!(result.exact);
    assert!(result.equity > 0.7);
    assert!(result.evaluations > 0);
}

#[test]
fn test_estimate_river_is_enumerated() {
    let villain = Range::opening(Position::Btn).unwrap();
    let board = parse_board("Ah7d2c9s4h").unwrap();
    let result = estimate(&hero("Ks", "Kd"), &villain, &board);
    assert!(result.exact);
    assert!(result.equity > 0.0 && result.equity < 1.0);
}

#[test]
fn test_estimate_falls_back_on_empty_range() {
    let villain = Range::default();
    let board = parse_board("Ah7d2c").unwrap();
    let result = estimate(&hero("Ks", "Kd"), &villain, &board);
    assert!(!result.exact);
    assert_eq!(result.evaluations, 0);
    assert!(result.equity >= 0.10 && result.equity <= 0.90);
}
