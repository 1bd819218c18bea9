use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, ALL_RANKS, ALL_SUITS};
use crate::error::{CoachError, CoachResult};
use crate::evaluator::evaluate_hand;
use crate::range::Range;

/// Simulation count for the Monte Carlo path (flop and earlier).
const DEFAULT_SIMULATIONS: usize = 20_000;

/// Clamp bounds for the heuristic fallback.
const HEURISTIC_FLOOR: f64 = 0.10;
const HEURISTIC_CEIL: f64 = 0.90;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityEstimate {
    /// Hero win probability in [0, 1]; ties count half.
    pub equity: f64,
    /// False when the combinatorial calculator failed and the additive
    /// heuristic took over.
    pub exact: bool,
    pub evaluations: usize,
}

/// Hero-hand-vs-villain-range win probability. The exact calculator is the
/// primary path; any failure falls back silently to the heuristic — the
/// degradation is visible only through `exact`.
pub fn estimate(hero: &[Card; 2], villain: &Range, board: &[Card]) -> EquityEstimate {
    match exact_equity(hero, villain, board) {
        Ok((equity, evaluations)) => EquityEstimate {
            equity,
            exact: true,
            evaluations,
        },
        Err(e) => {
            log::warn!("exact equity failed ({}); using heuristic", e);
            EquityEstimate {
                equity: heuristic_equity(hero, board),
                exact: false,
                evaluations: 0,
            }
        }
    }
}

fn build_remaining_deck(dead: &[Card]) -> Vec<Card> {
    let dead_set: std::collections::HashSet<Card> = dead.iter().copied().collect();
    ALL_RANKS
        .iter()
        .flat_map(|&r| ALL_SUITS.iter().map(move |&s| Card::new(r, s)))
        .filter(|c| !dead_set.contains(c))
        .collect()
}

fn exact_equity(hero: &[Card; 2], villain: &Range, board: &[Card]) -> CoachResult<(f64, usize)> {
    if board.len() > 5 {
        return Err(CoachError::Computation(format!(
            "board has {} cards",
            board.len()
        )));
    }
    let dead: std::collections::HashSet<Card> =
        hero.iter().chain(board.iter()).copied().collect();

    let combos: Vec<([Card; 2], f64)> = villain
        .weighted_combos()
        .into_iter()
        .filter(|(c, _)| !dead.contains(&c.high) && !dead.contains(&c.low))
        .map(|(c, w)| (c.cards(), w))
        .collect();

    if combos.is_empty() {
        return Err(CoachError::NoValidCombos);
    }

    if board.len() >= 4 {
        enumerate_runouts(hero, &combos, board)
    } else {
        monte_carlo(hero, &combos, board, DEFAULT_SIMULATIONS)
    }
}

/// Turn and river: few enough runouts to enumerate them all.
fn enumerate_runouts(
    hero: &[Card; 2],
    combos: &[([Card; 2], f64)],
    board: &[Card],
) -> CoachResult<(f64, usize)> {
    let results: Vec<(f64, f64, usize)> = combos
        .par_iter()
        .map(|(villain_hand, weight)| {
            let mut dead: Vec<Card> = Vec::new();
            dead.extend_from_slice(hero);
            dead.extend_from_slice(board);
            dead.extend_from_slice(villain_hand);
            let remaining = build_remaining_deck(&dead);

            let mut won = 0.0f64;
            let mut total = 0.0f64;
            let mut evals = 0usize;

            let runouts: Vec<Vec<Card>> = if board.len() == 5 {
                vec![vec![]]
            } else {
                remaining.iter().map(|&c| vec![c]).collect()
            };

            for runout in runouts {
                let mut full_board = board.to_vec();
                full_board.extend_from_slice(&runout);
                let r1 = match evaluate_hand(hero, &full_board) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                let r2 = match evaluate_hand(villain_hand, &full_board) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                evals += 1;
                total += weight;
                match r1.cmp(&r2) {
                    std::cmp::Ordering::Greater => won += weight,
                    std::cmp::Ordering::Equal => won += weight / 2.0,
                    std::cmp::Ordering::Less => {}
                }
            }
            (won, total, evals)
        })
        .collect();

    let (won, total, evals) = results.iter().fold((0.0, 0.0, 0), |acc, &(w, t, e)| {
        (acc.0 + w, acc.1 + t, acc.2 + e)
    });
    if total <= 0.0 {
        return Err(CoachError::NoValidCombos);
    }
    Ok((won / total, evals))
}

/// Preflop and flop: weighted Monte Carlo over random runouts.
fn monte_carlo(
    hero: &[Card; 2],
    combos: &[([Card; 2], f64)],
    board: &[Card],
    simulations: usize,
) -> CoachResult<(f64, usize)> {
    let sims_per = (simulations / combos.len()).max(1);

    let results: Vec<(f64, f64, usize)> = combos
        .par_iter()
        .map(|(villain_hand, weight)| {
            let mut dead: Vec<Card> = Vec::new();
            dead.extend_from_slice(hero);
            dead.extend_from_slice(board);
            dead.extend_from_slice(villain_hand);
            let remaining = build_remaining_deck(&dead);
            let cards_needed = 5 - board.len();

            let mut won = 0.0f64;
            let mut total = 0.0f64;
            let mut evals = 0usize;
            let mut rng = rand::thread_rng();

            for _ in 0..sims_per {
                let mut deck = remaining.clone();
                deck.shuffle(&mut rng);
                let runout = &deck[..cards_needed];
                let mut full_board = board.to_vec();
                full_board.extend_from_slice(runout);

                let r1 = match evaluate_hand(hero, &full_board) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                let r2 = match evaluate_hand(villain_hand, &full_board) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                evals += 1;
                total += weight;
                match r1.cmp(&r2) {
                    std::cmp::Ordering::Greater => won += weight,
                    std::cmp::Ordering::Equal => won += weight / 2.0,
                    std::cmp::Ordering::Less => {}
                }
            }
            (won, total, evals)
        })
        .collect();

    let (won, total, evals) = results.iter().fold((0.0, 0.0, 0), |acc, &(w, t, e)| {
        (acc.0 + w, acc.1 + t, acc.2 + e)
    });
    if total <= 0.0 {
        return Err(CoachError::NoValidCombos);
    }
    Ok((won / total, evals))
}

/// Bounded additive heuristic. The constants are empirically tuned
/// placeholders; only the surrounding pot-odds comparison is load-bearing.
pub fn heuristic_equity(hero: &[Card; 2], board: &[Card]) -> f64 {
    let mut equity: f64 = 0.40;
    if hero[0].rank == hero[1].rank {
        equity += 0.15;
    }
    if hero[0].suit == hero[1].suit {
        equity += 0.03;
    }
    if hero[0].value() as u32 + hero[1].value() as u32 >= 24 {
        equity += 0.10;
    }
    if hero
        .iter()
        .any(|h| board.iter().any(|b| b.rank == h.rank))
    {
        equity += 0.20;
    }
    equity.clamp(HEURISTIC_FLOOR, HEURISTIC_CEIL)
}

/// Equity needed to continue: bet / (pot + bet).
pub fn pot_odds(pot: f64, bet: f64) -> CoachResult<f64> {
    if pot <= 0.0 || bet <= 0.0 {
        return Err(CoachError::InvalidValue(
            "Pot and bet must be positive".to_string(),
        ));
    }
    Ok(bet / (pot + bet))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CallDecision {
    pub equity: f64,
    pub equity_needed: f64,
    pub profitable: bool,
}

/// A call is profitable iff equity strictly exceeds the price.
pub fn call_decision(equity: f64, pot: f64, bet: f64) -> CoachResult<CallDecision> {
    let equity_needed = pot_odds(pot, bet)?;
    Ok(CallDecision {
        equity,
        equity_needed,
        profitable: equity > equity_needed,
    })
}
