use std::collections::BTreeMap;

use hand_coach::classifier::*;
use hand_coach::hand::{
    Action, ActionKind, Actor, HandRecord, Position, PotSizes, Stacks, Street,
};
use hand_coach::range::Bucket;
use hand_coach::spr::compute_spr;
use hand_coach::strategy::{Branch, DecisionNode, StrategyTree};

fn action(street: Street, actor: Actor, kind: ActionKind) -> Action {
    Action {
        street,
        actor,
        kind,
        amount: None,
    }
}

fn bet(street: Street, actor: Actor, amount: f64) -> Action {
    Action {
        street,
        actor,
        kind: ActionKind::Bet,
        amount: Some(amount),
    }
}

fn record(actions: Vec<Action>, pots: PotSizes, stacks: Stacks) -> HandRecord {
    HandRecord {
        hero_position: Position::Utg,
        villain_position: Position::Btn,
        hero_cards: vec!["8h".to_string(), "8d".to_string()],
        board: vec!["Qs".to_string(), "7h".to_string(), "2c".to_string()],
        actions,
        stacks,
        pots,
        big_blind: 1.0,
    }
}

fn mixed_tree() -> StrategyTree {
    let mut tree = StrategyTree::default();
    tree.insert(
        Street::Preflop,
        Branch::Initial,
        DecisionNode::mixed(ActionKind::Raise, 0.7, None, ActionKind::Fold, 0.3),
    );
    tree.insert(
        Street::Flop,
        Branch::Initial,
        DecisionNode::mixed(ActionKind::Bet, 0.6, None, ActionKind::Check, 0.4),
    );
    tree.insert(
        Street::Flop,
        Branch::VsBet,
        DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Fold, 0.4),
    );
    tree
}

fn default_inputs<'a>(
    record: &'a HandRecord,
    tree: &'a StrategyTree,
    sprs: &'a [hand_coach::spr::SprSnapshot],
    buckets: &'a BTreeMap<Street, Bucket>,
) -> ClassifierInputs<'a> {
    ClassifierInputs {
        record,
        tree,
        sprs,
        hero_buckets: buckets,
        hero_equity: 0.45,
        hero_percentile: 0.5,
    }
}

fn deep_stacks() -> Stacks {
    Stacks {
        hero: 200.0,
        villain: 200.0,
    }
}

fn small_pots() -> PotSizes {
    PotSizes {
        preflop: 5.0,
        flop: Some(15.0),
        turn: None,
        river: None,
    }
}

#[test]
fn test_primary_action_is_optimal() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].verdict, Verdict::Optimal);
    assert!(result[0].leak_category.is_none());
}

#[test]
fn test_alternative_action_is_acceptable() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Hero, ActionKind::Check),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result.len(), 2);
    assert_eq!(result[1].street, Street::Flop);
    assert_eq!(result[1].verdict, Verdict::Acceptable);
}

#[test]
fn test_mistake_gets_exactly_one_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Hero, ActionKind::Raise),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    let flop = &result[1];
    assert_eq!(flop.verdict, Verdict::Mistake);
    assert!(flop.leak_category.is_some());
}

#[test]
fn test_preflop_fold_truncates_later_streets() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Villain, ActionKind::Raise),
            action(Street::Preflop, Actor::Hero, ActionKind::Fold),
            // Board data exists but hero never saw it.
            action(Street::Flop, Actor::Villain, ActionKind::Bet),
        ],
        small_pots(),
        deep_stacks(),
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Preflop,
        Branch::VsRaise,
        DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Fold, 0.4),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].street, Street::Preflop);
    assert_eq!(result[0].branch, Branch::VsRaise);
}

#[test]
fn test_branch_selection_vs_bet() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            bet(Street::Flop, Actor::Villain, 10.0),
            action(Street::Flop, Actor::Hero, ActionKind::Call),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result[1].branch, Branch::VsBet);
    assert_eq!(result[1].verdict, Verdict::Optimal);
}

#[test]
fn test_shove_zone_fold_is_spr_leak() {
    // Massive flop pot: SPR falls under the shove threshold.
    let pots = PotSizes {
        preflop: 40.0,
        flop: Some(120.0),
        turn: None,
        river: None,
    };
    let stacks = Stacks {
        hero: 100.0,
        villain: 100.0,
    };
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            bet(Street::Flop, Actor::Villain, 60.0),
            action(Street::Flop, Actor::Hero, ActionKind::Fold),
        ],
        pots,
        stacks,
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Flop,
        Branch::VsBet,
        DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Raise, 0.4),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let mut inputs = default_inputs(&rec, &tree, &sprs, &buckets);
    // Equity below pot odds so only the SPR rule can fire.
    inputs.hero_equity = 0.10;
    let result = classify_decisions(&inputs);
    assert_eq!(result[1].verdict, Verdict::Mistake);
    assert_eq!(result[1].leak_category, Some(LeakCategory::SprAwareness));
}

#[test]
fn test_fold_with_equity_edge_is_equity_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            bet(Street::Flop, Actor::Villain, 5.0),
            action(Street::Flop, Actor::Hero, ActionKind::Fold),
        ],
        small_pots(),
        deep_stacks(),
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Flop,
        Branch::VsBet,
        DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Raise, 0.4),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let mut inputs = default_inputs(&rec, &tree, &sprs, &buckets);
    // Needs 25% to call, holds 60%.
    inputs.hero_equity = 0.60;
    let result = classify_decisions(&inputs);
    assert_eq!(
        result[1].leak_category,
        Some(LeakCategory::EquityMiscalculation)
    );
}

#[test]
fn test_fold_top_decile_is_range_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Villain, ActionKind::Bet),
            action(Street::Flop, Actor::Hero, ActionKind::Fold),
        ],
        small_pots(),
        deep_stacks(),
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Flop,
        Branch::VsBet,
        DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Raise, 0.4),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let mut inputs = default_inputs(&rec, &tree, &sprs, &buckets);
    // No bet amount recorded, so the equity rule cannot fire.
    inputs.hero_percentile = 0.05;
    inputs.hero_equity = 0.10;
    let result = classify_decisions(&inputs);
    assert_eq!(result[1].leak_category, Some(LeakCategory::RangeAwareness));
}

#[test]
fn test_check_with_monster_is_value_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Hero, ActionKind::Check),
        ],
        small_pots(),
        deep_stacks(),
    );
    // Primary and alternative are both aggressive so checking is a mistake.
    let mut tree = StrategyTree::default();
    tree.insert(
        Street::Preflop,
        Branch::Initial,
        DecisionNode::pure(ActionKind::Raise),
    );
    tree.insert(
        Street::Flop,
        Branch::Initial,
        DecisionNode::mixed(ActionKind::Bet, 0.8, None, ActionKind::Raise, 0.2),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Flop, Bucket::Monster);
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result[1].leak_category, Some(LeakCategory::PostflopValue));
}

#[test]
fn test_check_behind_with_monster_is_street_leak() {
    // Villain checks first. Checking behind a monster is still a mistake
    // against an aggressive node, but not a missed-value leak; that tag is
    // reserved for hero opening the betting.
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Villain, ActionKind::Check),
            action(Street::Flop, Actor::Hero, ActionKind::Check),
        ],
        small_pots(),
        deep_stacks(),
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Flop,
        Branch::VsCheck,
        DecisionNode::mixed(ActionKind::Bet, 0.8, None, ActionKind::Raise, 0.2),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Flop, Bucket::Monster);
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result[1].branch, Branch::VsCheck);
    assert_eq!(result[1].verdict, Verdict::Mistake);
    assert_eq!(result[1].leak_category, Some(LeakCategory::FlopMistake));
}

#[test]
fn test_bet_with_air_is_bluff_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Hero, ActionKind::Bet),
        ],
        small_pots(),
        deep_stacks(),
    );
    let mut tree = mixed_tree();
    tree.insert(
        Street::Flop,
        Branch::Initial,
        DecisionNode::mixed(ActionKind::Check, 0.8, None, ActionKind::Fold, 0.2),
    );
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let mut buckets = BTreeMap::new();
    buckets.insert(Street::Flop, Bucket::Air);
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result[1].leak_category, Some(LeakCategory::PostflopBluff));
}

#[test]
fn test_street_tag_fallback_leak() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Call),
            action(Street::Preflop, Actor::Villain, ActionKind::Check),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    assert_eq!(result[0].verdict, Verdict::Mistake);
    assert_eq!(result[0].leak_category, Some(LeakCategory::PreflopMistake));
}

#[test]
fn test_leak_summary_counts_and_worst() {
    let rec = record(
        vec![
            action(Street::Preflop, Actor::Hero, ActionKind::Raise),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            action(Street::Flop, Actor::Hero, ActionKind::Raise),
        ],
        small_pots(),
        deep_stacks(),
    );
    let tree = mixed_tree();
    let sprs = compute_spr(&rec.pots, &rec.stacks);
    let buckets = BTreeMap::new();
    let result = classify_decisions(&default_inputs(&rec, &tree, &sprs, &buckets));
    let summary = LeakSummary::from_classifications(&result);
    assert_eq!(summary.optimal, 1);
    assert_eq!(summary.mistakes, 1);
    assert_eq!(summary.optimal + summary.acceptable + summary.mistakes, result.len());
    assert!(summary.worst_leak.is_some());
}
