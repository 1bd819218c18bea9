use serde::{Deserialize, Serialize};

use crate::cards::{hand_combos, Card, Rank, Suit, HAND_RANKING};
use crate::evaluator::{evaluate_hand, HandCategory};
use crate::range::RangeStats;

/// Gap in made-strength points below which the ranges are reported even.
const EVEN_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Leader {
    Hero,
    Villain,
    Even,
}

impl Leader {
    pub fn flipped(self) -> Leader {
        match self {
            Leader::Hero => Leader::Villain,
            Leader::Villain => Leader::Hero,
            Leader::Even => Leader::Even,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RangeAdvantage {
    pub leader: Leader,
    /// Absolute gap in made-strength percentage points.
    pub margin: f64,
    /// Leader's made strength over the trailer's (1.0 when even).
    pub ratio: f64,
}

/// Compares summed monster+strong+marginal shares of two stat bundles.
pub fn range_advantage(hero: &RangeStats, villain: &RangeStats) -> RangeAdvantage {
    let h = hero.made_strength();
    let v = villain.made_strength();
    let margin = (h - v).abs();
    if margin < EVEN_THRESHOLD {
        return RangeAdvantage {
            leader: Leader::Even,
            margin,
            ratio: 1.0,
        };
    }
    let (leader, num, den) = if h > v {
        (Leader::Hero, h, v)
    } else {
        (Leader::Villain, v, h)
    };
    let ratio = if den > 0.0 { num / den } else { f64::INFINITY };
    RangeAdvantage {
        leader,
        margin,
        ratio,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NutAdvantage {
    pub leader: Leader,
    pub margin: f64,
    /// A side with no monster combos at all is capped on this texture.
    pub hero_capped: bool,
    pub villain_capped: bool,
}

/// Compares monster-bucket shares specifically.
pub fn nut_advantage(hero: &RangeStats, villain: &RangeStats) -> NutAdvantage {
    let h = hero.monster;
    let v = villain.monster;
    let margin = (h - v).abs();
    let leader = if margin < f64::EPSILON {
        Leader::Even
    } else if h > v {
        Leader::Hero
    } else {
        Leader::Villain
    };
    NutAdvantage {
        leader,
        margin,
        hero_capped: h <= 0.0,
        villain_capped: v <= 0.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankBlocker {
    pub rank: Rank,
    /// Villain pair/broadway combos removed by the held card.
    pub blocked_combos: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockerReport {
    /// Suit hero holds two of while the board shows two or more.
    pub flush_blocker: Option<Suit>,
    pub rank_blockers: Vec<RankBlocker>,
}

/// Suit-concentration and Ace/King rank blockers for hero's exact holding.
pub fn detect_blockers(hero: &[Card; 2], board: &[Card]) -> BlockerReport {
    let flush_blocker = crate::cards::ALL_SUITS.into_iter().find(|&suit| {
        let held = hero.iter().filter(|c| c.suit == suit).count();
        let shown = board.iter().filter(|c| c.suit == suit).count();
        held == 2 && shown >= 2
    });

    let mut rank_blockers = Vec::new();
    for &rank in &[Rank::Ace, Rank::King] {
        if let Some(&held) = hero.iter().find(|c| c.rank == rank) {
            let blocked = blocked_broadway_combos(held);
            if blocked > 0 {
                rank_blockers.push(RankBlocker {
                    rank,
                    blocked_combos: blocked,
                });
            }
        }
    }

    BlockerReport {
        flush_blocker,
        rank_blockers,
    }
}

/// Counts combos of pair/broadway classes containing the held card.
fn blocked_broadway_combos(held: Card) -> u32 {
    let rank_char = held.rank.to_char();
    let mut blocked = 0u32;
    for &class in HAND_RANKING {
        if !class.contains(rank_char) {
            continue;
        }
        let broadway_or_pair = class
            .chars()
            .take(2)
            .all(|c| matches!(c, 'T' | 'J' | 'Q' | 'K' | 'A'))
            || class.len() == 2;
        if !broadway_or_pair {
            continue;
        }
        if let Ok(combos) = hand_combos(class) {
            blocked += combos
                .iter()
                .filter(|(a, b)| *a == held || *b == held)
                .count() as u32;
        }
    }
    blocked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MadeHandClass {
    SetOrBetter,
    Overpair,
    TopPairStrongKicker,
    TopPairWeakKicker,
    SecondPair,
    Underpair,
    AceHigh,
    Unmade,
}

impl MadeHandClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MadeHandClass::SetOrBetter => "set_or_better",
            MadeHandClass::Overpair => "overpair",
            MadeHandClass::TopPairStrongKicker => "top_pair_strong_kicker",
            MadeHandClass::TopPairWeakKicker => "top_pair_weak_kicker",
            MadeHandClass::SecondPair => "second_pair",
            MadeHandClass::Underpair => "underpair",
            MadeHandClass::AceHigh => "ace_high",
            MadeHandClass::Unmade => "unmade",
        }
    }

    fn tier(self) -> u8 {
        match self {
            MadeHandClass::SetOrBetter => 7,
            MadeHandClass::Overpair => 6,
            MadeHandClass::TopPairStrongKicker => 5,
            MadeHandClass::TopPairWeakKicker => 4,
            MadeHandClass::SecondPair => 3,
            MadeHandClass::Underpair => 2,
            MadeHandClass::AceHigh => 1,
            MadeHandClass::Unmade => 0,
        }
    }
}

impl std::fmt::Display for MadeHandClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroSpot {
    pub street: crate::hand::Street,
    pub class: MadeHandClass,
    /// Estimated fraction of villain's current range hero is ahead of.
    pub beats_fraction: f64,
    pub ahead: bool,
    /// Set when a new street flipped hero from ahead to behind or back.
    pub flipped: bool,
}

/// Classifies hero's concrete holding against the board.
pub fn classify_hero_hand(hero: &[Card; 2], board: &[Card]) -> MadeHandClass {
    if board.len() < 3 {
        return MadeHandClass::Unmade;
    }
    let result = match evaluate_hand(hero, board) {
        Ok(r) => r,
        Err(_) => return MadeHandClass::Unmade,
    };
    let board_high = board.iter().map(|c| c.value()).max().unwrap_or(0);
    let pocket_pair = hero[0].rank == hero[1].rank;

    match result.category {
        HandCategory::HighCard => {
            if hero.iter().any(|c| c.rank == Rank::Ace) {
                MadeHandClass::AceHigh
            } else {
                MadeHandClass::Unmade
            }
        }
        HandCategory::OnePair => {
            let pair_val = result.kickers[0];
            let board_paired = board.iter().filter(|c| c.value() == pair_val).count() >= 2;
            if board_paired {
                return if hero.iter().any(|c| c.rank == Rank::Ace) {
                    MadeHandClass::AceHigh
                } else {
                    MadeHandClass::Unmade
                };
            }
            if pocket_pair && hero[0].value() > board_high {
                MadeHandClass::Overpair
            } else if pair_val == board_high {
                let kicker = hero
                    .iter()
                    .map(|c| c.value())
                    .find(|&v| v != pair_val)
                    .unwrap_or(0);
                if kicker >= Rank::Ten.value() {
                    MadeHandClass::TopPairStrongKicker
                } else {
                    MadeHandClass::TopPairWeakKicker
                }
            } else if pocket_pair {
                // Pocket pair below the top card.
                let second = second_board_value(board, board_high);
                if hero[0].value() > second {
                    MadeHandClass::SecondPair
                } else {
                    MadeHandClass::Underpair
                }
            } else {
                MadeHandClass::SecondPair
            }
        }
        _ => MadeHandClass::SetOrBetter,
    }
}

fn second_board_value(board: &[Card], high: u8) -> u8 {
    board
        .iter()
        .map(|c| c.value())
        .filter(|&v| v < high)
        .max()
        .unwrap_or(0)
}

/// Analyzes hero's concrete holding against villain's range distribution,
/// flagging when a new street flips who is ahead.
pub fn hero_spot_analysis(
    hero: &[Card; 2],
    villain: &RangeStats,
    board: &[Card],
    street: crate::hand::Street,
    previous: Option<&HeroSpot>,
) -> HeroSpot {
    let class = classify_hero_hand(hero, board);
    let beats_fraction = beats_fraction(class, villain);
    let ahead = beats_fraction > 0.5;
    let flipped = previous.map_or(false, |p| p.ahead != ahead);
    HeroSpot {
        street,
        class,
        beats_fraction,
        ahead,
        flipped,
    }
}

/// Maps hero's made-hand tier onto villain's bucket distribution: hero beats
/// every bucket whose showdown tier falls below their own.
fn beats_fraction(class: MadeHandClass, villain: &RangeStats) -> f64 {
    let tier = class.tier();
    // Villain buckets by the part of hero's ladder they correspond to.
    let mut beaten = villain.air + villain.draw_weak + villain.draw_strong;
    if tier >= MadeHandClass::SecondPair.tier() {
        beaten += villain.marginal * 0.5;
    }
    if tier >= MadeHandClass::TopPairStrongKicker.tier() {
        beaten += villain.marginal * 0.5;
    }
    if tier >= MadeHandClass::Overpair.tier() {
        beaten += villain.strong * 0.6;
    }
    if tier >= MadeHandClass::SetOrBetter.tier() {
        beaten += villain.strong * 0.4 + villain.monster * 0.5;
    }
    if tier <= MadeHandClass::AceHigh.tier() {
        // Unmade hands only beat the air they dominate.
        beaten = villain.air * 0.5;
    }
    (beaten / 100.0).clamp(0.0, 1.0)
}
