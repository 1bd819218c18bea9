use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::cards::{hand_combos, hand_strength_index, simplify_hand, Card, Rank};
use crate::error::{CoachError, CoachResult};
use crate::evaluator::{evaluate_hand, HandCategory};
use crate::hand::{ActionKind, Position, PotType};

static PREFLOP_RANGES_JSON: &str = include_str!("../data/preflop_ranges.json");

#[derive(Deserialize, Debug)]
struct RangeTables {
    open: HashMap<String, HashMap<String, f64>>,
    call: HashMap<String, HashMap<String, f64>>,
}

static TABLES: Lazy<RangeTables> = Lazy::new(|| {
    serde_json::from_str(PREFLOP_RANGES_JSON).expect("Failed to parse preflop range tables")
});

/// Weight floor; anything at or below this is treated as removed.
const MIN_WEIGHT: f64 = 1e-6;

/// Fraction of weight retained when a filter would empty the range.
const EMPTY_GUARD_PCT: f64 = 0.01;

/// An immutable two-card starting hand in canonical order (higher card first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandCombo {
    pub high: Card,
    pub low: Card,
}

impl HandCombo {
    pub fn new(a: Card, b: Card) -> HandCombo {
        if a >= b {
            HandCombo { high: a, low: b }
        } else {
            HandCombo { high: b, low: a }
        }
    }

    pub fn cards(&self) -> [Card; 2] {
        [self.high, self.low]
    }

    pub fn contains(&self, card: Card) -> bool {
        self.high == card || self.low == card
    }

    /// 169-class notation for this combo.
    pub fn class(&self) -> String {
        simplify_hand(&[self.high, self.low]).unwrap_or_else(|_| "??".to_string())
    }
}

impl std::fmt::Display for HandCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.high, self.low)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Air,
    DrawWeak,
    DrawStrong,
    Marginal,
    Strong,
    Monster,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Monster => "monster",
            Bucket::Strong => "strong",
            Bucket::Marginal => "marginal",
            Bucket::DrawStrong => "draw_strong",
            Bucket::DrawWeak => "draw_weak",
            Bucket::Air => "air",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only snapshot of a range's current shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeStats {
    /// Total weighted combo count.
    pub combos: f64,
    pub monster: f64,
    pub strong: f64,
    pub marginal: f64,
    pub draw_strong: f64,
    pub draw_weak: f64,
    pub air: f64,
    /// Strongest hand classes still carrying weight, best first.
    pub top_hands: Vec<String>,
}

impl RangeStats {
    /// Summed made-hand share used for range-advantage comparison.
    pub fn made_strength(&self) -> f64 {
        self.monster + self.strong + self.marginal
    }
}

/// A weighted set of starting-hand combos. Every transformation derives a
/// fresh Range; nothing is mutated in place.
#[derive(Debug, Clone, Default)]
pub struct Range {
    weights: HashMap<HandCombo, f64>,
    buckets: HashMap<HandCombo, Bucket>,
}

impl Range {
    fn seeded(table: &HashMap<String, f64>) -> Range {
        let mut weights = HashMap::new();
        for (class, &weight) in table {
            if weight <= MIN_WEIGHT {
                continue;
            }
            if let Ok(combos) = hand_combos(class) {
                for (a, b) in combos {
                    weights.insert(HandCombo::new(a, b), weight.min(1.0));
                }
            }
        }
        Range {
            weights,
            buckets: HashMap::new(),
        }
    }

    /// Range seeded for the player who opened the pot from `position`.
    pub fn opening(position: Position) -> CoachResult<Range> {
        TABLES
            .open
            .get(position.as_str())
            .map(Range::seeded)
            .ok_or_else(|| {
                CoachError::Computation(format!("no opening table for {}", position))
            })
    }

    /// Range seeded for the player who called an open from `position`.
    pub fn calling(position: Position) -> CoachResult<Range> {
        TABLES
            .call
            .get(position.as_str())
            .map(Range::seeded)
            .ok_or_else(|| {
                CoachError::Computation(format!("no calling table for {}", position))
            })
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn weight(&self, combo: &HandCombo) -> f64 {
        self.weights.get(combo).copied().unwrap_or(0.0)
    }

    pub fn bucket(&self, combo: &HandCombo) -> Option<Bucket> {
        self.buckets.get(combo).copied()
    }

    pub fn weighted_combos(&self) -> Vec<(HandCombo, f64)> {
        self.weights.iter().map(|(&c, &w)| (c, w)).collect()
    }

    /// Short-stack push/fold profile: below 20bb the range collapses toward a
    /// polarized subset of pairs, aces, and broadways.
    pub fn apply_stack_filter(&self, effective_stack_bb: f64) -> Range {
        if effective_stack_bb >= 20.0 {
            return self.clone();
        }
        let mut weights = HashMap::new();
        for (&combo, &w) in &self.weights {
            let factor = short_stack_factor(&combo);
            let scaled = w * factor;
            if scaled > MIN_WEIGHT {
                weights.insert(combo, scaled);
            }
        }
        let out = Range {
            weights,
            buckets: self.buckets.clone(),
        };
        self.guard_empty(out)
    }

    /// Re-raised pots start from a tighter slice of the seeded range; the
    /// cutoff falls with each additional preflop raise.
    pub fn apply_pot_type_filter(&self, pot_type: PotType) -> Range {
        let keep = match pot_type {
            PotType::SingleRaised => return self.clone(),
            PotType::ThreeBet => 0.40,
            PotType::FourBet => 0.15,
        };
        self.retain_top_percentile(keep)
    }

    /// Relabels every surviving combo into one of the six buckets, removing
    /// any combo that shares a card with the board.
    pub fn categorize(&self, board: &[Card]) -> Range {
        let mut weights = HashMap::new();
        let mut buckets = HashMap::new();
        for (&combo, &w) in &self.weights {
            if board.iter().any(|&c| combo.contains(c)) {
                continue;
            }
            let bucket = if board.len() >= 3 {
                categorize_postflop(&combo, board)
            } else {
                categorize_preflop(&combo)
            };
            weights.insert(combo, w);
            buckets.insert(combo, bucket);
        }
        let out = Range { weights, buckets };
        self.guard_empty(out)
    }

    /// Down-weights combos inconsistent with an observed action.
    pub fn apply_action_filter(
        &self,
        kind: ActionKind,
        is_aggressor: bool,
        board: &[Card],
    ) -> Range {
        // Filtering needs bucket labels; derive them if the caller skipped
        // categorize for this board.
        let labeled = if self.buckets.len() < self.weights.len() {
            self.categorize(board)
        } else {
            self.clone()
        };

        let mut weights = HashMap::new();
        for (&combo, &w) in &labeled.weights {
            let bucket = labeled.buckets.get(&combo).copied().unwrap_or(Bucket::Air);
            let factor = action_factor(kind, is_aggressor, bucket);
            let scaled = w * factor;
            if scaled > MIN_WEIGHT {
                weights.insert(combo, scaled);
            }
        }
        let out = Range {
            weights,
            buckets: labeled.buckets.clone(),
        };
        labeled.guard_empty(out)
    }

    /// Aggregates the current weights into a distribution snapshot.
    pub fn stats(&self) -> RangeStats {
        let total = self.total_weight();
        if total <= MIN_WEIGHT {
            return RangeStats {
                combos: 0.0,
                monster: 0.0,
                strong: 0.0,
                marginal: 0.0,
                draw_strong: 0.0,
                draw_weak: 0.0,
                air: 0.0,
                top_hands: Vec::new(),
            };
        }

        let mut sums: HashMap<Bucket, f64> = HashMap::new();
        for (combo, &w) in &self.weights {
            let bucket = self.buckets.get(combo).copied().unwrap_or(Bucket::Air);
            *sums.entry(bucket).or_insert(0.0) += w;
        }
        let pct = |b: Bucket| sums.get(&b).copied().unwrap_or(0.0) / total * 100.0;

        let monster = pct(Bucket::Monster);
        let strong = pct(Bucket::Strong);
        let marginal = pct(Bucket::Marginal);
        let draw_strong = pct(Bucket::DrawStrong);
        let draw_weak = pct(Bucket::DrawWeak);
        // Air absorbs the rounding remainder so the sum never exceeds 100.
        let air =
            (100.0 - monster - strong - marginal - draw_strong - draw_weak).max(0.0);

        // Strongest classes still carrying weight, best first.
        let mut class_weights: HashMap<String, f64> = HashMap::new();
        for (combo, &w) in &self.weights {
            *class_weights.entry(combo.class()).or_insert(0.0) += w;
        }
        let mut classes: Vec<(String, f64)> = class_weights.into_iter().collect();
        classes.sort_by_key(|(class, _)| hand_strength_index(class));
        let top_hands = classes
            .into_iter()
            .take(10)
            .map(|(class, _)| class)
            .collect();

        RangeStats {
            combos: total,
            monster,
            strong,
            marginal,
            draw_strong,
            draw_weak,
            air,
            top_hands,
        }
    }

    /// Fraction of total weight held by combos with a strictly stronger hand
    /// class. Values under 0.10 mean the class sits in the range's top decile.
    pub fn strength_percentile(&self, class: &str) -> f64 {
        let total = self.total_weight();
        if total <= MIN_WEIGHT {
            return 1.0;
        }
        let target = hand_strength_index(class);
        let stronger: f64 = self
            .weights
            .iter()
            .filter(|(combo, _)| hand_strength_index(&combo.class()) < target)
            .map(|(_, &w)| w)
            .sum();
        stronger / total
    }

    /// A filter that would empty the range instead retains the top 1% of the
    /// source by weight, so downstream stats never divide by zero.
    fn guard_empty(&self, filtered: Range) -> Range {
        if filtered.total_weight() > MIN_WEIGHT {
            return filtered;
        }
        log::warn!("range emptied by filter; retaining top percentile");
        self.retain_top_percentile(EMPTY_GUARD_PCT)
    }

    fn retain_top_percentile(&self, pct: f64) -> Range {
        let total = self.total_weight();
        let target = total * pct;
        let mut entries: Vec<(HandCombo, f64)> =
            self.weights.iter().map(|(&c, &w)| (c, w)).collect();
        entries.sort_by_key(|(combo, _)| hand_strength_index(&combo.class()));

        let mut weights = HashMap::new();
        let mut running = 0.0;
        for (combo, w) in entries {
            weights.insert(combo, w);
            running += w;
            if running >= target && !weights.is_empty() {
                break;
            }
        }
        Range {
            weights,
            buckets: self.buckets.clone(),
        }
    }
}

fn short_stack_factor(combo: &HandCombo) -> f64 {
    let pair = combo.high.rank == combo.low.rank;
    let suited = combo.high.suit == combo.low.suit;
    let has_ace = combo.high.rank == Rank::Ace;
    let broadway = combo.high.rank >= Rank::Ten && combo.low.rank >= Rank::Ten;
    if pair {
        1.0
    } else if has_ace {
        0.9
    } else if broadway {
        0.8
    } else if suited && gap(combo) <= 2 {
        0.3
    } else {
        0.15
    }
}

fn gap(combo: &HandCombo) -> u8 {
    combo.high.value() - combo.low.value()
}

fn action_factor(kind: ActionKind, is_aggressor: bool, bucket: Bucket) -> f64 {
    match kind {
        ActionKind::Fold => match bucket {
            Bucket::Monster | Bucket::Strong => 0.0,
            Bucket::DrawStrong => 0.1,
            Bucket::Marginal => 0.5,
            Bucket::DrawWeak => 0.8,
            Bucket::Air => 1.0,
        },
        ActionKind::Check => match bucket {
            // An aggressor checking caps the range harder.
            Bucket::Monster => {
                if is_aggressor {
                    0.3
                } else {
                    0.5
                }
            }
            Bucket::Strong => 0.7,
            _ => 1.0,
        },
        ActionKind::Call => match bucket {
            Bucket::Monster => 0.6,
            Bucket::Strong | Bucket::Marginal | Bucket::DrawStrong => 1.0,
            Bucket::DrawWeak => 0.6,
            Bucket::Air => 0.05,
        },
        ActionKind::Bet => match bucket {
            Bucket::Monster | Bucket::Strong => 1.0,
            Bucket::DrawStrong => 0.75,
            Bucket::Marginal => 0.4,
            Bucket::DrawWeak => 0.3,
            Bucket::Air => {
                if is_aggressor {
                    0.25
                } else {
                    0.15
                }
            }
        },
        // Top of the distribution plus a reduced-weight bluff tail.
        ActionKind::Raise => match bucket {
            Bucket::Monster => 1.0,
            Bucket::Strong => 0.9,
            Bucket::DrawStrong => 0.8,
            Bucket::DrawWeak => 0.35,
            Bucket::Marginal => 0.2,
            Bucket::Air => 0.1,
        },
    }
}

fn categorize_preflop(combo: &HandCombo) -> Bucket {
    let idx = hand_strength_index(&combo.class());
    let suited = combo.high.suit == combo.low.suit;
    let has_ace = combo.high.rank == Rank::Ace;
    if idx < 10 {
        Bucket::Monster
    } else if idx < 30 {
        Bucket::Strong
    } else if idx < 70 {
        Bucket::Marginal
    } else if suited && (gap(combo) <= 2 || has_ace) {
        Bucket::DrawStrong
    } else if suited {
        Bucket::DrawWeak
    } else {
        Bucket::Air
    }
}

fn categorize_postflop(combo: &HandCombo, board: &[Card]) -> Bucket {
    let cards = combo.cards();
    let result = match evaluate_hand(&cards, board) {
        Ok(r) => r,
        Err(_) => return Bucket::Air,
    };
    let board_high = board.iter().map(|c| c.value()).max().unwrap_or(0);

    match result.category {
        HandCategory::Straight
        | HandCategory::Flush
        | HandCategory::FullHouse
        | HandCategory::FourOfAKind
        | HandCategory::StraightFlush
        | HandCategory::RoyalFlush
        | HandCategory::ThreeOfAKind
        | HandCategory::TwoPair => Bucket::Monster,
        HandCategory::OnePair => {
            let pair_val = result.kickers[0];
            let pocket_pair = combo.high.rank == combo.low.rank;
            let board_paired = is_board_paired(board, pair_val);
            if board_paired {
                // Pair is on the board; hole cards play as kickers only.
                return if combo.high.rank == Rank::Ace {
                    Bucket::Marginal
                } else {
                    Bucket::Air
                };
            }
            if pocket_pair && combo.high.value() > board_high {
                Bucket::Strong // overpair
            } else if pair_val == board_high {
                // Top pair; kicker tier decides.
                let kicker = if combo.high.value() == pair_val {
                    combo.low.value()
                } else {
                    combo.high.value()
                };
                if kicker >= Rank::Ten.value() {
                    Bucket::Strong
                } else {
                    Bucket::Marginal
                }
            } else {
                Bucket::Marginal // second pair, underpair, weak pair
            }
        }
        HandCategory::HighCard => categorize_unmade(combo, board),
    }
}

fn is_board_paired(board: &[Card], pair_val: u8) -> bool {
    board.iter().filter(|c| c.value() == pair_val).count() >= 2
}

fn categorize_unmade(combo: &HandCombo, board: &[Card]) -> Bucket {
    if has_flush_draw(combo, board) || has_straight_draw(combo, board) {
        return Bucket::DrawStrong;
    }
    let board_high = board.iter().map(|c| c.value()).max().unwrap_or(0);
    let overcards = combo.high.value() > board_high && combo.low.value() > board_high;
    if overcards {
        Bucket::DrawWeak
    } else {
        Bucket::Air
    }
}

fn has_flush_draw(combo: &HandCombo, board: &[Card]) -> bool {
    if board.len() >= 5 {
        return false;
    }
    for suit in crate::cards::ALL_SUITS {
        let hole = combo.cards().iter().filter(|c| c.suit == suit).count();
        let on_board = board.iter().filter(|c| c.suit == suit).count();
        if hole >= 1 && hole + on_board == 4 {
            return true;
        }
    }
    false
}

fn has_straight_draw(combo: &HandCombo, board: &[Card]) -> bool {
    if board.len() >= 5 {
        return false;
    }
    let mut values: std::collections::HashSet<u8> =
        board.iter().map(|c| c.value()).collect();
    let hole: std::collections::HashSet<u8> =
        combo.cards().iter().map(|c| c.value()).collect();
    values.extend(&hole);
    // Ace plays low as 1.
    if values.contains(&14) {
        values.insert(1);
    }

    for low in 1..=10u8 {
        let window: Vec<u8> = (low..low + 5).collect();
        let present = window.iter().filter(|v| values.contains(v)).count();
        let uses_hole = window.iter().any(|v| hole.contains(v) || (*v == 1 && hole.contains(&14)));
        if present >= 4 && uses_hole {
            return true;
        }
    }
    false
}

/// Bucket for a single concrete combo on a board; preflop buckets fall back
/// to the 169-class strength ordering.
pub fn combo_bucket(combo: &HandCombo, board: &[Card]) -> Bucket {
    if board.len() >= 3 {
        categorize_postflop(combo, board)
    } else {
        categorize_preflop(combo)
    }
}
