use std::collections::BTreeMap;

use hand_coach::hand::{ActionKind, Position, PositionContext, PotSizes, PotType, Stacks, Street};
use hand_coach::range::Bucket;
use hand_coach::spr::compute_spr;
use hand_coach::strategy::*;

fn ctx(hero: Position, villain: Position, aggressor: bool) -> PositionContext {
    PositionContext {
        hero,
        villain,
        hero_in_position: hero.acts_after(villain),
        hero_preflop_aggressor: aggressor,
        pot_type: PotType::SingleRaised,
    }
}

#[test]
fn test_parse_llm_tree_plain_json() {
    let text = r#"{
        "flop": {
            "initial": {
                "primary": {"action": "bet", "frequency": 0.7, "sizing": "66% pot"},
                "alternative": {"action": "check", "frequency": 0.3}
            }
        }
    }"#;
    let tree = parse_llm_tree(text).unwrap();
    let node = tree.get(Street::Flop, Branch::Initial).unwrap();
    assert_eq!(node.primary.action, ActionKind::Bet);
    assert!((node.primary.frequency - 0.7).abs() < 0.001);
    assert_eq!(node.primary.sizing.as_deref(), Some("66% pot"));
}

#[test]
fn test_parse_llm_tree_strips_fences() {
    let text = "```json\n{\"turn\": {\"vs_bet\": {\"primary\": {\"action\": \"call\", \"frequency\": 1.0}}}}\n```";
    let tree = parse_llm_tree(text).unwrap();
    assert!(tree.get(Street::Turn, Branch::VsBet).is_some());
}

#[test]
fn test_parse_llm_tree_rejects_garbage() {
    assert!(parse_llm_tree("the board is wet, bet big").is_err());
    assert!(parse_llm_tree("{}").is_err());
}

#[test]
fn test_normalize_keeps_dominant_action_primary() {
    let text = r#"{
        "river": {
            "initial": {
                "primary": {"action": "check", "frequency": 0.2},
                "alternative": {"action": "bet", "frequency": 0.8}
            }
        }
    }"#;
    let tree = parse_llm_tree(text).unwrap();
    let node = tree.get(Street::River, Branch::Initial).unwrap();
    assert_eq!(node.primary.action, ActionKind::Bet);
    assert!(node.primary.frequency >= node.alternative.as_ref().unwrap().frequency);
}

#[test]
fn test_normalize_clamps_frequencies() {
    let text = r#"{
        "flop": {
            "initial": {"primary": {"action": "bet", "frequency": 1.7}}
        }
    }"#;
    let tree = parse_llm_tree(text).unwrap();
    let node = tree.get(Street::Flop, Branch::Initial).unwrap();
    assert!((node.primary.frequency - 1.0).abs() < 0.001);
}

fn fallback(
    hero_class: &str,
    buckets: BTreeMap<Street, Bucket>,
    streets: &[Street],
    pot: f64,
) -> StrategyTree {
    let stacks = Stacks {
        hero: 100.0,
        villain: 100.0,
    };
    let pots = PotSizes {
        preflop: pot,
        flop: streets.contains(&Street::Flop).then_some(pot * 3.0),
        turn: None,
        river: None,
    };
    let sprs = compute_spr(&pots, &stacks);
    fallback_tree(&FallbackInputs {
        ctx: &ctx(Position::Utg, Position::Btn, true),
        hero_class,
        hero_buckets: &buckets,
        sprs: &sprs,
        streets_reached: streets,
    })
}

#[test]
fn test_fallback_covers_reached_streets() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Strong);
    buckets.insert(Street::Flop, Bucket::Marginal);
    let tree = fallback(
        "AQs",
        buckets,
        &[Street::Preflop, Street::Flop],
        10.0,
    );
    assert!(tree.get(Street::Preflop, Branch::Initial).is_some());
    assert!(tree.get(Street::Flop, Branch::Initial).is_some());
    assert!(tree.get(Street::Flop, Branch::VsBet).is_some());
    assert!(tree.get(Street::Turn, Branch::Initial).is_none());
}

#[test]
fn test_fallback_premium_opens() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Monster);
    let tree = fallback("AA", buckets, &[Street::Preflop], 10.0);
    let node = tree.get(Street::Preflop, Branch::Initial).unwrap();
    assert_eq!(node.primary.action, ActionKind::Raise);
}

#[test]
fn test_fallback_trash_folds() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Air);
    let tree = fallback("72o", buckets, &[Street::Preflop], 10.0);
    let node = tree.get(Street::Preflop, Branch::Initial).unwrap();
    assert_eq!(node.primary.action, ActionKind::Fold);
}

#[test]
fn test_fallback_monster_bets_for_value() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Strong);
    buckets.insert(Street::Flop, Bucket::Monster);
    let tree = fallback(
        "AKs",
        buckets,
        &[Street::Preflop, Street::Flop],
        10.0,
    );
    let node = tree.get(Street::Flop, Branch::Initial).unwrap();
    assert_eq!(node.primary.action, ActionKind::Bet);
}

#[test]
fn test_fallback_air_gives_up_vs_raise() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Marginal);
    buckets.insert(Street::Flop, Bucket::Air);
    let tree = fallback(
        "T9s",
        buckets,
        &[Street::Preflop, Street::Flop],
        10.0,
    );
    let node = tree.get(Street::Flop, Branch::VsRaise).unwrap();
    assert_eq!(node.primary.action, ActionKind::Fold);
    assert!(node.alternative.is_none());
}

#[test]
fn test_fallback_shove_zone_sizes_all_in() {
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Preflop, Bucket::Monster);
    buckets.insert(Street::Flop, Bucket::Monster);
    // Huge pot relative to stacks pushes the flop SPR under 3.
    let tree = fallback(
        "AA",
        buckets,
        &[Street::Preflop, Street::Flop],
        30.0,
    );
    let node = tree.get(Street::Flop, Branch::Initial).unwrap();
    assert_eq!(node.primary.sizing.as_deref(), Some("all-in"));
}
