use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{CoachError, CoachResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> CoachResult<Rank> {
        match c {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(CoachError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub fn from_char(c: char) -> CoachResult<Suit> {
        match c.to_ascii_lowercase() {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(CoachError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank.hash(state);
        self.suit.hash(state);
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank
            .cmp(&other.rank)
            .then(self.suit.cmp(&other.suit))
    }
}

pub fn parse_card(notation: &str) -> CoachResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() != 2 {
        return Err(CoachError::InvalidCardNotation(notation.to_string()));
    }
    let rank = Rank::from_char(chars[0].to_ascii_uppercase())?;
    let suit = Suit::from_char(chars[1])?;
    Ok(Card::new(rank, suit))
}

pub fn parse_board(notation: &str) -> CoachResult<Vec<Card>> {
    let notation = notation.trim().replace(' ', "").replace(',', "");
    if notation.len() % 2 != 0 {
        return Err(CoachError::InvalidBoardNotation(notation.to_string()));
    }
    let mut cards = Vec::new();
    let chars: Vec<char> = notation.chars().collect();
    for i in (0..chars.len()).step_by(2) {
        let s: String = chars[i..i + 2].iter().collect();
        cards.push(parse_card(&s)?);
    }
    Ok(cards)
}

/// Collapses two specific cards into 169-class notation ("AKs", "T9o", "77").
pub fn simplify_hand(cards: &[Card]) -> CoachResult<String> {
    if cards.len() != 2 {
        return Err(CoachError::InvalidHandSize);
    }
    let (c1, c2) = (cards[0], cards[1]);
    let (r1, r2) = if c1.rank >= c2.rank {
        (c1.rank, c2.rank)
    } else {
        (c2.rank, c1.rank)
    };

    if r1 == r2 {
        return Ok(format!("{}{}", r1.to_char(), r2.to_char()));
    }

    let suffix = if c1.suit == c2.suit { "s" } else { "o" };
    Ok(format!("{}{}{}", r1.to_char(), r2.to_char(), suffix))
}

/// Expands a 169-class notation into every concrete two-card combination.
pub fn hand_combos(notation: &str) -> CoachResult<Vec<(Card, Card)>> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();

    // Pair notation: "AA"
    if chars.len() == 2 && chars[0] == chars[1] {
        let rank = Rank::from_char(chars[0])?;
        let mut combos = Vec::new();
        for i in 0..ALL_SUITS.len() {
            for j in (i + 1)..ALL_SUITS.len() {
                combos.push((Card::new(rank, ALL_SUITS[i]), Card::new(rank, ALL_SUITS[j])));
            }
        }
        return Ok(combos);
    }

    // Suited/offsuit notation: "AKs" or "AKo"
    if chars.len() == 3 {
        let r1 = Rank::from_char(chars[0])?;
        let r2 = Rank::from_char(chars[1])?;
        let kind = chars[2];

        if kind == 's' {
            let combos = ALL_SUITS
                .iter()
                .map(|&s| (Card::new(r1, s), Card::new(r2, s)))
                .collect();
            return Ok(combos);
        } else if kind == 'o' {
            let mut combos = Vec::new();
            for &s1 in &ALL_SUITS {
                for &s2 in &ALL_SUITS {
                    if s1 != s2 {
                        combos.push((Card::new(r1, s1), Card::new(r2, s2)));
                    }
                }
            }
            return Ok(combos);
        }
    }

    // Specific cards: "AsKh"
    if chars.len() == 4 {
        let c1 = parse_card(&notation[..2])?;
        let c2 = parse_card(&notation[2..])?;
        return Ok(vec![(c1, c2)]);
    }

    Err(CoachError::InvalidHandNotation(notation.to_string()))
}

pub fn combo_count(notation: &str) -> u32 {
    let chars: Vec<char> = notation.chars().collect();
    if chars.len() == 2 && chars[0] == chars[1] {
        return 6;
    }
    if chars.len() == 3 {
        if chars[2] == 's' {
            return 4;
        }
        if chars[2] == 'o' {
            return 12;
        }
    }
    0
}

/// All 169 starting-hand classes ordered from strongest to weakest.
pub const HAND_RANKING: &[&str] = &[
    "AA", "KK", "QQ", "AKs", "JJ", "AQs", "KQs", "AJs", "KJs", "TT",
    "AKo", "ATs", "QJs", "KTs", "QTs", "JTs", "99", "AQo", "A9s", "KQo",
    "K9s", "T9s", "J9s", "Q9s", "A8s", "88", "A5s", "A7s", "A4s", "A6s",
    "A3s", "K8s", "T8s", "A2s", "98s", "J8s", "77", "Q8s", "K7s", "AJo",
    "87s", "66", "K6s", "ATo", "97s", "76s", "T7s", "K5s", "55", "J7s",
    "86s", "KJo", "65s", "Q7s", "K4s", "K3s", "K2s", "96s", "44", "QJo",
    "75s", "54s", "A9o", "T6s", "KTo", "J6s", "Q6s", "33", "85s", "64s",
    "QTo", "22", "53s", "JTo", "K9o", "J9o", "T9o", "Q9o", "74s", "43s",
    "A8o", "A5o", "A7o", "A4o", "A6o", "A3o", "95s", "63s", "A2o", "52s",
    "84s", "42s", "T8o", "98o", "J8o", "Q8o", "73s", "87o", "32s", "62s",
    "97o", "76o", "K8o", "86o", "65o", "94s", "93s", "92s", "T7o", "54o",
    "83s", "75o", "82s", "K7o", "K6o", "72s", "96o", "J7o", "K5o", "T6o",
    "K4o", "K3o", "K2o", "85o", "Q7o", "64o", "53o", "J6o", "Q6o", "Q5o",
    "Q4o", "Q3o", "Q2o", "74o", "43o", "95o", "63o", "84o", "42o", "T5o",
    "T4o", "T3o", "T2o", "52o", "J5o", "J4o", "J3o", "J2o", "73o", "32o",
    "62o", "94o", "93o", "92o", "83o", "82o", "72o",
];

/// Position of a hand class in the strength ordering; unknown classes sort last.
pub fn hand_strength_index(hand: &str) -> usize {
    HAND_RANKING
        .iter()
        .position(|&h| h == hand)
        .unwrap_or(HAND_RANKING.len())
}
