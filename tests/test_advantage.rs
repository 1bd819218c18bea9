use hand_coach::advantage::*;
use hand_coach::cards::{parse_board, parse_card, Card, Rank, Suit};
use hand_coach::hand::Street;
use hand_coach::range::RangeStats;

fn stats(monster: f64, strong: f64, marginal: f64, air: f64) -> RangeStats {
    RangeStats {
        combos: 100.0,
        monster,
        strong,
        marginal,
        draw_strong: 0.0,
        draw_weak: 0.0,
        air,
        top_hands: Vec::new(),
    }
}

fn hero(c1: &str, c2: &str) -> [Card; 2] {
    [parse_card(c1).unwrap(), parse_card(c2).unwrap()]
}

#[test]
fn test_range_advantage_leader() {
    let h = stats(20.0, 30.0, 20.0, 30.0);
    let v = stats(5.0, 15.0, 20.0, 60.0);
    let adv = range_advantage(&h, &v);
    assert_eq!(adv.leader, Leader::Hero);
    assert!((adv.margin - 30.0).abs() < 0.001);
    assert!(adv.ratio > 1.0);
}

#[test]
fn test_range_advantage_even_within_threshold() {
    let h = stats(10.0, 20.0, 20.0, 50.0);
    let v = stats(10.0, 20.0, 24.0, 46.0);
    let adv = range_advantage(&h, &v);
    assert_eq!(adv.leader, Leader::Even);
}

#[test]
fn test_range_advantage_symmetry() {
    let h = stats(25.0, 25.0, 10.0, 40.0);
    let v = stats(5.0, 10.0, 15.0, 70.0);
    let forward = range_advantage(&h, &v);
    let backward = range_advantage(&v, &h);
    assert_eq!(backward.leader, forward.leader.flipped());
    assert!((backward.margin - forward.margin).abs() < 0.001);
}

#[test]
fn test_nut_advantage_symmetry() {
    let h = stats(18.0, 20.0, 20.0, 42.0);
    let v = stats(4.0, 30.0, 20.0, 46.0);
    let forward = nut_advantage(&h, &v);
    let backward = nut_advantage(&v, &h);
    assert_eq!(forward.leader, Leader::Hero);
    assert_eq!(backward.leader, Leader::Villain);
    assert!((backward.margin - forward.margin).abs() < 0.001);
}

#[test]
fn test_nut_advantage_capped_side() {
    let h = stats(12.0, 20.0, 20.0, 48.0);
    let v = stats(0.0, 35.0, 25.0, 40.0);
    let adv = nut_advantage(&h, &v);
    assert!(adv.villain_capped);
    assert!(!adv.hero_capped);
    assert_eq!(adv.leader, Leader::Hero);
}

#[test]
fn test_flush_blocker_detected() {
    let board = parse_board("Kh9h2c").unwrap();
    let report = detect_blockers(&hero("Ah", "Qh"), &board);
    assert_eq!(report.flush_blocker, Some(Suit::Hearts));
}

#[test]
fn test_no_flush_blocker_with_one_card() {
    let board = parse_board("Kh9h2c").unwrap();
    let report = detect_blockers(&hero("Ah", "Qc"), &board);
    assert_eq!(report.flush_blocker, None);
}

#[test]
fn test_ace_rank_blocker() {
    let board = parse_board("7d5c2s").unwrap();
    let report = detect_blockers(&hero("As", "Kd"), &board);
    let ranks: Vec<Rank> = report.rank_blockers.iter().map(|b| b.rank).collect();
    assert!(ranks.contains(&Rank::Ace));
    assert!(ranks.contains(&Rank::King));
    for blocker in &report.rank_blockers {
        assert!(blocker.blocked_combos > 0);
    }
}

#[test]
fn test_classify_set() {
    let board = parse_board("8h7d2c").unwrap();
    assert_eq!(
        classify_hero_hand(&hero("8s", "8d"), &board),
        MadeHandClass::SetOrBetter
    );
}

#[test]
fn test_classify_overpair() {
    let board = parse_board("8h7d2c").unwrap();
    assert_eq!(
        classify_hero_hand(&hero("Qs", "Qd"), &board),
        MadeHandClass::Overpair
    );
}

#[test]
fn test_classify_top_pair_kicker_tiers() {
    let board = parse_board("Kh8d3c").unwrap();
    assert_eq!(
        classify_hero_hand(&hero("Ks", "Qd"), &board),
        MadeHandClass::TopPairStrongKicker
    );
    assert_eq!(
        classify_hero_hand(&hero("Ks", "6d"), &board),
        MadeHandClass::TopPairWeakKicker
    );
}

#[test]
fn test_classify_second_pair_and_underpair() {
    let board = parse_board("Kh8d3c").unwrap();
    assert_eq!(
        classify_hero_hand(&hero("9s", "9d"), &board),
        MadeHandClass::SecondPair
    );
    assert_eq!(
        classify_hero_hand(&hero("5s", "5d"), &board),
        MadeHandClass::Underpair
    );
}

#[test]
fn test_classify_ace_high() {
    let board = parse_board("Kh8d3c").unwrap();
    assert_eq!(
        classify_hero_hand(&hero("As", "5d"), &board),
        MadeHandClass::AceHigh
    );
}

#[test]
fn test_classify_preflop_is_unmade() {
    assert_eq!(classify_hero_hand(&hero("As", "Ad"), &[]), MadeHandClass::Unmade);
}

#[test]
fn test_hero_spot_flip_flag() {
    let flop = parse_board("Qh8d3c").unwrap();
    let villain = stats(5.0, 15.0, 20.0, 60.0);
    let first = hero_spot_analysis(&hero("Qs", "Jd"), &villain, &flop, Street::Flop, None);
    assert!(first.ahead);

    // Turn pairs the board away from hero; a strong villain range now leads.
    let turn = parse_board("Qh8d3c8h").unwrap();
    let strong_villain = stats(40.0, 40.0, 15.0, 5.0);
    let second = hero_spot_analysis(
        &hero("Qs", "Jd"),
        &strong_villain,
        &turn,
        Street::Turn,
        Some(&first),
    );
    if !second.ahead {
        assert!(second.flipped);
    }
}
