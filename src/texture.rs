use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::{CoachError, CoachResult};
use crate::hand::Street;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Wetness {
    Dry,
    Medium,
    Wet,
}

impl std::fmt::Display for Wetness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Wetness::Dry => write!(f, "dry"),
            Wetness::Medium => write!(f, "medium"),
            Wetness::Wet => write!(f, "wet"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectedness {
    Disconnected,
    SemiConnected,
    Connected,
}

impl std::fmt::Display for Connectedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connectedness::Disconnected => write!(f, "disconnected"),
            Connectedness::SemiConnected => write!(f, "semi-connected"),
            Connectedness::Connected => write!(f, "connected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardTexture {
    pub high_card: char,
    pub is_paired: bool,
    pub is_monotone: bool,
    pub is_two_tone: bool,
    pub is_rainbow: bool,
    pub flush_possible: bool,
    pub straight_possible: bool,
    pub connectedness: Connectedness,
    pub wetness: Wetness,
    pub category: String,
}

pub fn analyze_board(board_cards: &[Card]) -> CoachResult<BoardTexture> {
    if board_cards.len() < 3 {
        return Err(CoachError::NotEnoughCards {
            need: 3,
            got: board_cards.len(),
        });
    }

    let mut values: Vec<u8> = board_cards.iter().map(|c| c.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let suits: Vec<_> = board_cards.iter().map(|c| c.suit).collect();
    let mut suit_counts: HashMap<_, u32> = HashMap::new();
    for &s in &suits {
        *suit_counts.entry(s).or_insert(0) += 1;
    }
    let max_suit = *suit_counts.values().max().unwrap();

    let first_three_same = {
        let s: HashSet<_> = suits[..3].iter().collect();
        s.len() == 1
    };
    let is_monotone = max_suit >= 3 && first_three_same;
    let is_two_tone = !is_monotone && max_suit >= 2;
    let is_rainbow = max_suit == 1;

    let mut rank_counts: HashMap<u8, u32> = HashMap::new();
    for &v in &values {
        *rank_counts.entry(v).or_insert(0) += 1;
    }
    let is_paired = *rank_counts.values().max().unwrap() >= 2;

    let mut unique_vals: Vec<u8> = values
        .iter()
        .copied()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    unique_vals.sort_unstable();

    let mut gaps: Vec<u8> = Vec::new();
    for i in 0..unique_vals.len().saturating_sub(1) {
        gaps.push(unique_vals[i + 1] - unique_vals[i]);
    }
    let has_connected = gaps.iter().any(|&g| g == 1);
    let has_one_gap = gaps.iter().any(|&g| g == 2);

    let connectedness = if has_connected && gaps.iter().filter(|&&g| g <= 2).count() >= 2 {
        Connectedness::Connected
    } else if has_connected || has_one_gap {
        Connectedness::SemiConnected
    } else {
        Connectedness::Disconnected
    };

    let straight_possible = has_straight_potential(&values);
    let flush_possible = max_suit >= 2;

    let mut wet_score: i32 = 0;
    if is_monotone {
        wet_score += 3;
    } else if is_two_tone {
        wet_score += 1;
    }
    if connectedness == Connectedness::Connected {
        wet_score += 2;
    } else if connectedness == Connectedness::SemiConnected {
        wet_score += 1;
    }
    if is_paired {
        wet_score -= 1;
    }
    let wetness = if wet_score >= 3 {
        Wetness::Wet
    } else if wet_score >= 1 {
        Wetness::Medium
    } else {
        Wetness::Dry
    };

    let high_rank = value_to_rank(values[0]);
    let mut parts = Vec::new();
    if is_monotone {
        parts.push("monotone".to_string());
    } else if is_two_tone {
        parts.push("two-tone".to_string());
    } else {
        parts.push("rainbow".to_string());
    }
    parts.push(connectedness.to_string());
    if is_paired {
        parts.push("paired".to_string());
    }
    parts.push(format!("{}-high", high_rank));
    let category = parts.join(" ");

    Ok(BoardTexture {
        high_card: high_rank,
        is_paired,
        is_monotone,
        is_two_tone,
        is_rainbow,
        flush_possible,
        straight_possible,
        connectedness,
        wetness,
        category,
    })
}

fn has_straight_potential(values: &[u8]) -> bool {
    let unique: Vec<u8> = {
        let mut s: Vec<u8> = values
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        s.sort_unstable();
        s
    };

    for i in 0..unique.len() {
        let window_count = unique
            .iter()
            .filter(|&&v| v >= unique[i] && v <= unique[i] + 4)
            .count();
        if window_count >= 3 {
            return true;
        }
    }

    if unique.contains(&14) {
        let mut low_window: Vec<u8> = unique.iter().filter(|&&v| v <= 5).copied().collect();
        low_window.push(1);
        if low_window.len() >= 3 {
            return true;
        }
    }

    false
}

fn value_to_rank(value: u8) -> char {
    match value {
        2 => '2',
        3 => '3',
        4 => '4',
        5 => '5',
        6 => '6',
        7 => '7',
        8 => '8',
        9 => '9',
        10 => 'T',
        11 => 'J',
        12 => 'Q',
        13 => 'K',
        14 => 'A',
        _ => '?',
    }
}

/// Tier 1 output: per-street texture narrative with the flags the strategy
/// request serializes forward. Normally produced by the narrator; the local
/// template fallback builds the same shape deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextureNarrative {
    pub street_tags: BTreeMap<Street, String>,
    pub paired: bool,
    pub flush_possible: bool,
    pub straight_possible: bool,
    pub summary: String,
}

impl TextureNarrative {
    /// Template-based default used when the external texture call fails.
    pub fn from_board(board: &[Card]) -> TextureNarrative {
        if board.len() < 3 {
            return TextureNarrative {
                street_tags: BTreeMap::new(),
                paired: false,
                flush_possible: false,
                straight_possible: false,
                summary: "Hand ended preflop; no board to describe.".to_string(),
            };
        }

        let mut street_tags = BTreeMap::new();
        let mut paired = false;
        let mut flush_possible = false;
        let mut straight_possible = false;
        let mut summary = String::new();

        for street in [Street::Flop, Street::Turn, Street::River] {
            let n = street.board_len();
            if board.len() < n {
                break;
            }
            if let Ok(texture) = analyze_board(&board[..n]) {
                street_tags.insert(street, texture.category.clone());
                paired = texture.is_paired;
                flush_possible = texture.flush_possible;
                straight_possible = texture.straight_possible;
                summary = format!(
                    "{} board: {}.",
                    street,
                    texture.category
                );
            }
        }

        TextureNarrative {
            street_tags,
            paired,
            flush_possible,
            straight_possible,
            summary,
        }
    }
}
