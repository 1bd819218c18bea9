use hand_coach::advantage::Leader;
use hand_coach::classifier::Verdict;
use hand_coach::error::CoachError;
use hand_coach::hand::{
    Action, ActionKind, Actor, HandRecord, Position, PotSizes, Stacks, Street,
};
use hand_coach::narrator::StaticNarrator;
use hand_coach::pipeline::analyze;

fn action(street: Street, actor: Actor, kind: ActionKind) -> Action {
    Action {
        street,
        actor,
        kind,
        amount: None,
    }
}

fn bet(street: Street, actor: Actor, kind: ActionKind, amount: f64) -> Action {
    Action {
        street,
        actor,
        kind,
        amount: Some(amount),
    }
}

/// Hero opens a pocket pair UTG, button calls, board comes A-K-Q.
fn reference_hand() -> HandRecord {
    HandRecord {
        hero_position: Position::Utg,
        villain_position: Position::Btn,
        hero_cards: vec!["8h".to_string(), "8d".to_string()],
        board: vec!["As".to_string(), "Kd".to_string(), "Qc".to_string()],
        actions: vec![
            bet(Street::Preflop, Actor::Hero, ActionKind::Raise, 2.5),
            action(Street::Preflop, Actor::Villain, ActionKind::Call),
            bet(Street::Flop, Actor::Hero, ActionKind::Bet, 4.0),
            action(Street::Flop, Actor::Villain, ActionKind::Call),
        ],
        stacks: Stacks {
            hero: 200.0,
            villain: 200.0,
        },
        pots: PotSizes {
            preflop: 6.0,
            flop: Some(14.0),
            turn: None,
            river: None,
        },
        big_blind: 1.0,
    }
}

#[tokio::test]
async fn test_report_always_returned_with_failing_narrator() {
    let narrator = StaticNarrator::failing();
    let report = analyze(&reference_hand(), &narrator).await.unwrap();
    assert!(report.degradation.texture_fallback);
    assert!(report.degradation.strategy_fallback);
    // Deterministic engines still ran in full.
    assert!(!report.spr_analysis.is_empty());
    assert!(!report.gto_strategy_tree.is_empty());
    assert!(report.ranges_per_street.contains_key(&Street::Preflop));
    assert!(report.ranges_per_street.contains_key(&Street::Flop));
}

#[tokio::test]
async fn test_aggressor_nut_advantage_on_broadway_board() {
    let narrator = StaticNarrator::failing();
    let report = analyze(&reference_hand(), &narrator).await.unwrap();
    let nut = &report.advantage_analysis.nut;
    // The caller's range holds far fewer broadway monsters; whenever it is
    // not outright capped the preflop aggressor must lead.
    if !nut.villain_capped {
        assert_eq!(nut.leader, Leader::Hero);
    }
    assert!(!nut.hero_capped);
}

#[tokio::test]
async fn test_classifications_cover_reached_streets_only() {
    let narrator = StaticNarrator::failing();
    let report = analyze(&reference_hand(), &narrator).await.unwrap();
    assert_eq!(report.decision_classifications.len(), 2);
    let streets: Vec<Street> = report
        .decision_classifications
        .iter()
        .map(|c| c.street)
        .collect();
    assert_eq!(streets, vec![Street::Preflop, Street::Flop]);
    let summary = &report.leak_summary;
    assert_eq!(
        summary.optimal + summary.acceptable + summary.mistakes,
        report.decision_classifications.len()
    );
}

#[tokio::test]
async fn test_preflop_fold_produces_no_postflop_classifications() {
    let mut record = reference_hand();
    record.actions = vec![
        bet(Street::Preflop, Actor::Villain, ActionKind::Raise, 2.5),
        action(Street::Preflop, Actor::Hero, ActionKind::Fold),
    ];
    let narrator = StaticNarrator::failing();
    let report = analyze(&record, &narrator).await.unwrap();
    for c in &report.decision_classifications {
        assert_eq!(c.street, Street::Preflop);
    }
}

#[tokio::test]
async fn test_equity_runs_exactly_with_failing_narrator() {
    let narrator = StaticNarrator::failing();
    let report = analyze(&reference_hand(), &narrator).await.unwrap();
    // The Monte Carlo path is local; a dead narrator must not degrade it.
    assert!(report.equity_analysis.estimate.exact);
    assert!(!report.degradation.equity_heuristic);
    let eq = report.equity_analysis.estimate.equity;
    assert!(eq > 0.0 && eq < 1.0);
}

#[tokio::test]
async fn test_malformed_input_is_the_only_surfaced_error() {
    let narrator = StaticNarrator::failing();

    let mut no_actions = reference_hand();
    no_actions.actions.clear();
    let err = analyze(&no_actions, &narrator).await.unwrap_err();
    assert!(matches!(err, CoachError::Input(_)));

    let mut bad_cards = reference_hand();
    bad_cards.hero_cards = vec!["Xx".to_string(), "8d".to_string()];
    assert!(analyze(&bad_cards, &narrator).await.is_err());

    let mut one_card = reference_hand();
    one_card.hero_cards.pop();
    assert!(analyze(&one_card, &narrator).await.is_err());

    // Pot growth the stacks cannot have funded.
    let mut overgrown = reference_hand();
    overgrown.pots.flop = Some(500.0);
    assert!(analyze(&overgrown, &narrator).await.is_err());
}

#[tokio::test]
async fn test_static_narrator_success_path() {
    use hand_coach::strategy::{Branch, DecisionNode, StrategyTree};
    use hand_coach::texture::TextureNarrative;

    let mut tree = StrategyTree::default();
    tree.insert(
        Street::Preflop,
        Branch::Initial,
        DecisionNode::pure(ActionKind::Raise),
    );
    tree.insert(
        Street::Flop,
        Branch::Initial,
        DecisionNode::mixed(ActionKind::Check, 0.7, None, ActionKind::Bet, 0.3),
    );
    let narrative = TextureNarrative {
        street_tags: [(Street::Flop, "broadway-heavy, dry".to_string())]
            .into_iter()
            .collect(),
        paired: false,
        flush_possible: false,
        straight_possible: true,
        summary: "Three broadway cards favor the raiser.".to_string(),
    };
    let narrator = StaticNarrator::new(narrative, tree);

    let report = analyze(&reference_hand(), &narrator).await.unwrap();
    assert!(!report.degradation.texture_fallback);
    assert!(!report.degradation.strategy_fallback);
    assert_eq!(
        report.board_summary.narrative.summary,
        "Three broadway cards favor the raiser."
    );
    // Hero raised preflop into a pure-raise node, then bet into a
    // check-primary node.
    assert_eq!(report.decision_classifications[0].verdict, Verdict::Optimal);
    assert_eq!(
        report.decision_classifications[1].verdict,
        Verdict::Acceptable
    );
}

#[tokio::test]
async fn test_hand_record_json_round_trip() {
    let record = reference_hand();
    let json = serde_json::to_string(&record).unwrap();
    let parsed: HandRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.hero_position, Position::Utg);
    assert_eq!(parsed.actions.len(), 4);
    let narrator = StaticNarrator::failing();
    assert!(analyze(&parsed, &narrator).await.is_ok());
}
