use std::collections::BTreeMap;
use std::time::Duration;

use crate::advantage::{
    detect_blockers, hero_spot_analysis, nut_advantage, range_advantage, HeroSpot,
};
use crate::cards::{simplify_hand, Card};
use crate::classifier::{classify_decisions, ClassifierInputs, LeakSummary};
use crate::equity::{call_decision, estimate};
use crate::error::CoachResult;
use crate::hand::{Actor, HandRecord, PositionContext, Street, ALL_STREETS};
use crate::narrator::{with_fallback, Narrator, StrategyRequest, TextureRequest};
use crate::range::{combo_bucket, Bucket, HandCombo, Range, RangeStats};
use crate::report::{
    AdvantageAnalysis, BoardSummary, Degradation, EquityAnalysis, Report, StreetRanges,
};
use crate::spr::compute_spr;
use crate::strategy::{fallback_tree, FallbackInputs, StrategyTree};
use crate::texture::{analyze_board, TextureNarrative};

const NARRATIVE_TIMEOUT: Duration = Duration::from_secs(12);

/// Runs the full five-tier analysis. The only error that surfaces is a
/// malformed hand record; every external or computational failure downstream
/// is absorbed into the degradation flags.
pub async fn analyze(record: &HandRecord, narrator: &dyn Narrator) -> CoachResult<Report> {
    record.validate()?;
    let hero = record.hero_hand()?;
    let board = record.board_cards()?;
    let ctx = PositionContext::from_record(record);
    let streets = reached_streets(record);
    let mut degradation = Degradation::default();

    // Tier 1: board texture narration, template fallback on failure.
    let texture = if board.len() >= 3 {
        analyze_board(&board).ok()
    } else {
        None
    };
    let texture_request = TextureRequest {
        board: record.board.clone(),
        texture: texture.clone(),
    };
    let (narrative, texture_fell_back) = with_fallback(
        "texture",
        NARRATIVE_TIMEOUT,
        narrator.board_texture(&texture_request),
        || TextureNarrative::from_board(&board),
    )
    .await;
    degradation.texture_fallback = texture_fell_back;

    // Tier 2: range derivation and SPR, independent branches run in
    // parallel on the rayon pool.
    let (ranges, sprs) = rayon::join(
        || derive_ranges(record, &ctx, &streets),
        || compute_spr(&record.pots, &record.stacks),
    );

    // Tier 3: equity and advantage, independent branches.
    let final_street = *streets.last().unwrap_or(&Street::Preflop);
    let final_board = record.board_at(final_street)?;
    let (equity_analysis, advantage_analysis) = rayon::join(
        || compute_equity(record, &hero, &ranges.villain_final, &final_board, final_street),
        || compute_advantage(&hero, &ranges, &final_board, final_street, record),
    );
    degradation.equity_heuristic = !equity_analysis.estimate.exact;

    // Tier 4: strategy tree, deterministic fallback on failure.
    let hero_buckets = hero_buckets(record, &hero, &streets);
    let hero_class = simplify_hand(&hero)?;
    let strategy_request = StrategyRequest {
        position: ctx,
        hero_hand: record.hero_cards.clone(),
        board: record.board.clone(),
        narrative: narrative.clone(),
        hero_stats: ranges.hero_stats.clone(),
        villain_stats: ranges.villain_stats.clone(),
        sprs: sprs.clone(),
        hero_equity: equity_analysis.estimate.equity,
    };
    let (tree, strategy_fell_back): (StrategyTree, bool) = with_fallback(
        "strategy",
        NARRATIVE_TIMEOUT,
        narrator.strategy(&strategy_request),
        || {
            fallback_tree(&FallbackInputs {
                ctx: &ctx,
                hero_class: &hero_class,
                hero_buckets: &hero_buckets,
                sprs: &sprs,
                streets_reached: &streets,
            })
        },
    )
    .await;
    degradation.strategy_fallback = strategy_fell_back;

    // Tier 5: grade hero's actual line against the tree.
    let hero_percentile = ranges.hero_preflop.strength_percentile(&hero_class);
    let classifications = classify_decisions(&ClassifierInputs {
        record,
        tree: &tree,
        sprs: &sprs,
        hero_buckets: &hero_buckets,
        hero_equity: equity_analysis.estimate.equity,
        hero_percentile,
    });
    let leak_summary = LeakSummary::from_classifications(&classifications);

    if degradation.any() {
        log::info!(
            "degraded analysis: texture_fallback={} strategy_fallback={} equity_heuristic={}",
            degradation.texture_fallback,
            degradation.strategy_fallback,
            degradation.equity_heuristic
        );
    }

    Ok(Report {
        board_summary: BoardSummary {
            narrative,
            texture,
        },
        ranges_per_street: ranges.per_street,
        equity_analysis,
        advantage_analysis,
        spr_analysis: sprs,
        gto_strategy_tree: tree,
        decision_classifications: classifications,
        leak_summary,
        degradation,
    })
}

fn reached_streets(record: &HandRecord) -> Vec<Street> {
    ALL_STREETS
        .into_iter()
        .filter(|&s| record.hero_reached(s) && s <= record.street_reached())
        .collect()
}

struct RangeOutputs {
    per_street: BTreeMap<Street, StreetRanges>,
    hero_stats: BTreeMap<Street, RangeStats>,
    villain_stats: BTreeMap<Street, RangeStats>,
    hero_preflop: Range,
    villain_final: Range,
}

/// Seeds both players' preflop ranges from position and role, then narrows
/// them street by street from the observed actions. Each street's snapshot
/// is taken after that street's filtering.
fn derive_ranges(record: &HandRecord, ctx: &PositionContext, streets: &[Street]) -> RangeOutputs {
    let stack_bb = record.effective_stack_bb();
    let hero_start = seed_range(ctx.hero, ctx.hero_preflop_aggressor);
    let villain_start = seed_range(ctx.villain, !ctx.hero_preflop_aggressor);
    let hero_preflop = hero_start
        .apply_stack_filter(stack_bb)
        .apply_pot_type_filter(ctx.pot_type);
    let mut hero_range = hero_preflop.clone();
    let mut villain_range = villain_start
        .apply_stack_filter(stack_bb)
        .apply_pot_type_filter(ctx.pot_type);

    let mut per_street = BTreeMap::new();
    let mut hero_stats = BTreeMap::new();
    let mut villain_stats = BTreeMap::new();

    for &street in streets {
        let board = record.board_at(street).unwrap_or_default();
        hero_range = hero_range.categorize(&board);
        villain_range = villain_range.categorize(&board);

        for action in record.actions_on(street) {
            match action.actor {
                Actor::Hero => {
                    hero_range = hero_range.apply_action_filter(
                        action.kind,
                        ctx.hero_preflop_aggressor,
                        &board,
                    );
                }
                Actor::Villain => {
                    villain_range = villain_range.apply_action_filter(
                        action.kind,
                        !ctx.hero_preflop_aggressor,
                        &board,
                    );
                }
            }
        }

        let h = hero_range.stats();
        let v = villain_range.stats();
        per_street.insert(
            street,
            StreetRanges {
                hero: h.clone(),
                villain: v.clone(),
            },
        );
        hero_stats.insert(street, h);
        villain_stats.insert(street, v);
    }

    RangeOutputs {
        per_street,
        hero_stats,
        villain_stats,
        hero_preflop,
        villain_final: villain_range,
    }
}

fn seed_range(position: crate::hand::Position, aggressor: bool) -> Range {
    let seeded = if aggressor {
        Range::opening(position)
    } else {
        Range::calling(position)
    };
    match seeded {
        Ok(range) => range,
        Err(err) => {
            log::warn!("range seeding failed for {position}: {err}");
            Range::default()
        }
    }
}

fn compute_equity(
    record: &HandRecord,
    hero: &[Card; 2],
    villain: &Range,
    board: &[Card],
    street: Street,
) -> EquityAnalysis {
    let estimate = estimate(hero, villain, board);
    let call = facing_bet(record, street)
        .and_then(|(pot, bet)| call_decision(estimate.equity, pot, bet).ok());
    EquityAnalysis { estimate, call }
}

/// Pot and bet size when the last villain action on the street was
/// aggressive with a recorded amount.
fn facing_bet(record: &HandRecord, street: Street) -> Option<(f64, f64)> {
    let pot = record.pots.at(street)?;
    let bet = record
        .actions_on(street)
        .iter()
        .rev()
        .find(|a| a.actor == Actor::Villain && a.kind.is_aggressive())
        .and_then(|a| a.amount)?;
    Some((pot, bet))
}

fn compute_advantage(
    hero: &[Card; 2],
    ranges: &RangeOutputs,
    final_board: &[Card],
    final_street: Street,
    record: &HandRecord,
) -> AdvantageAnalysis {
    let empty = RangeStats {
        combos: 0.0,
        monster: 0.0,
        strong: 0.0,
        marginal: 0.0,
        draw_strong: 0.0,
        draw_weak: 0.0,
        air: 0.0,
        top_hands: Vec::new(),
    };
    let hero_stats = ranges.hero_stats.get(&final_street).unwrap_or(&empty);
    let villain_stats = ranges.villain_stats.get(&final_street).unwrap_or(&empty);

    let mut hero_spots: Vec<HeroSpot> = Vec::new();
    for (&street, stats) in &ranges.villain_stats {
        if street.board_len() < 3 {
            continue;
        }
        let board = record.board_at(street).unwrap_or_default();
        if board.len() < 3 {
            continue;
        }
        let prev = hero_spots.last();
        let spot = hero_spot_analysis(hero, stats, &board, street, prev);
        hero_spots.push(spot);
    }

    AdvantageAnalysis {
        range: range_advantage(hero_stats, villain_stats),
        nut: nut_advantage(hero_stats, villain_stats),
        blockers: detect_blockers(hero, final_board),
        hero_spots,
    }
}

fn hero_buckets(
    record: &HandRecord,
    hero: &[Card; 2],
    streets: &[Street],
) -> BTreeMap<Street, Bucket> {
    let combo = HandCombo::new(hero[0], hero[1]);
    streets
        .iter()
        .map(|&street| {
            let board = record.board_at(street).unwrap_or_default();
            (street, combo_bucket(&combo, &board))
        })
        .collect()
}
