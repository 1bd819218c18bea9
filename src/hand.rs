use serde::{Deserialize, Serialize};

use crate::cards::{parse_card, Card};
use crate::error::{CoachError, CoachResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

pub const ALL_STREETS: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

impl Street {
    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }

    /// Number of board cards dealt by this street.
    pub fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl std::fmt::Display for Street {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Hero,
    Villain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
        }
    }

    pub fn is_aggressive(self) -> bool {
        matches!(self, ActionKind::Bet | ActionKind::Raise)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Action {
    pub street: Street,
    pub actor: Actor,
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "UTG")]
    Utg,
    #[serde(rename = "HJ")]
    Hj,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "BTN")]
    Btn,
    #[serde(rename = "SB")]
    Sb,
    #[serde(rename = "BB")]
    Bb,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Utg => "UTG",
            Position::Hj => "HJ",
            Position::Co => "CO",
            Position::Btn => "BTN",
            Position::Sb => "SB",
            Position::Bb => "BB",
        }
    }

    /// Postflop act order around the table; higher acts later.
    fn postflop_order(self) -> u8 {
        match self {
            Position::Sb => 0,
            Position::Bb => 1,
            Position::Utg => 2,
            Position::Hj => 3,
            Position::Co => 4,
            Position::Btn => 5,
        }
    }

    pub fn acts_after(self, other: Position) -> bool {
        self.postflop_order() > other.postflop_order()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-street running pot totals. A missing street was never reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PotSizes {
    pub preflop: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub river: Option<f64>,
}

impl PotSizes {
    pub fn at(&self, street: Street) -> Option<f64> {
        match street {
            Street::Preflop => Some(self.preflop),
            Street::Flop => self.flop,
            Street::Turn => self.turn,
            Street::River => self.river,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Stacks {
    pub hero: f64,
    pub villain: f64,
}

impl Stacks {
    pub fn effective(&self) -> f64 {
        self.hero.min(self.villain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotType {
    SingleRaised,
    ThreeBet,
    FourBet,
}

/// Parsed, validated hand record as uploaded by the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandRecord {
    pub hero_position: Position,
    pub villain_position: Position,
    /// Hero's two hole cards, e.g. ["Ah", "Kd"].
    pub hero_cards: Vec<String>,
    /// Community cards revealed so far, e.g. ["Qs", "Jh", "2c"].
    #[serde(default)]
    pub board: Vec<String>,
    pub actions: Vec<Action>,
    pub stacks: Stacks,
    pub pots: PotSizes,
    #[serde(default = "default_big_blind")]
    pub big_blind: f64,
}

fn default_big_blind() -> f64 {
    1.0
}

impl HandRecord {
    /// Validates input shape. Anything this rejects is fatal and aborts the
    /// pipeline before Tier 1; everything downstream recovers locally.
    pub fn validate(&self) -> CoachResult<()> {
        if self.hero_cards.len() != 2 {
            return Err(CoachError::Input(format!(
                "expected 2 hero cards, got {}",
                self.hero_cards.len()
            )));
        }
        self.hero_hand()?;
        self.board_cards()?;
        if self.actions.is_empty() {
            return Err(CoachError::Input("no actions in hand record".to_string()));
        }
        if !self.actions.iter().any(|a| a.actor == Actor::Hero) {
            return Err(CoachError::Input(
                "no identifiable hero action".to_string(),
            ));
        }
        if self.hero_position == self.villain_position {
            return Err(CoachError::Input(
                "hero and villain share a position".to_string(),
            ));
        }
        if self.stacks.hero <= 0.0 || self.stacks.villain <= 0.0 {
            return Err(CoachError::Input("non-positive stack".to_string()));
        }
        if self.big_blind <= 0.0 {
            return Err(CoachError::Input("non-positive big blind".to_string()));
        }
        if self.pots.preflop <= 0.0 {
            return Err(CoachError::Input("non-positive preflop pot".to_string()));
        }
        let mut prev = self.pots.preflop;
        for street in [Street::Flop, Street::Turn, Street::River] {
            if let Some(pot) = self.pots.at(street) {
                if pot < prev {
                    return Err(CoachError::Input(format!(
                        "pot shrank on the {}",
                        street
                    )));
                }
                prev = pot;
            }
        }
        // Half of all postflop pot growth came out of each stack.
        let invested = (prev - self.pots.preflop) / 2.0;
        if invested > self.stacks.effective() {
            return Err(CoachError::Input(
                "pot growth exceeds the effective stack".to_string(),
            ));
        }
        Ok(())
    }

    pub fn hero_hand(&self) -> CoachResult<[Card; 2]> {
        let c1 = parse_card(&self.hero_cards[0])
            .map_err(|e| CoachError::Input(e.to_string()))?;
        let c2 = parse_card(&self.hero_cards[1])
            .map_err(|e| CoachError::Input(e.to_string()))?;
        if c1 == c2 {
            return Err(CoachError::Input("duplicate hero card".to_string()));
        }
        Ok([c1, c2])
    }

    pub fn board_cards(&self) -> CoachResult<Vec<Card>> {
        self.board
            .iter()
            .map(|s| parse_card(s).map_err(|e| CoachError::Input(e.to_string())))
            .collect()
    }

    /// Board prefix visible on a given street.
    pub fn board_at(&self, street: Street) -> CoachResult<Vec<Card>> {
        let cards = self.board_cards()?;
        let n = street.board_len().min(cards.len());
        Ok(cards[..n].to_vec())
    }

    /// Last street that has any recorded action.
    pub fn street_reached(&self) -> Street {
        self.actions
            .iter()
            .map(|a| a.street)
            .max()
            .unwrap_or(Street::Preflop)
    }

    /// Hero sees a street unless an earlier street ended with a hero fold.
    pub fn hero_reached(&self, street: Street) -> bool {
        if street == Street::Preflop {
            return true;
        }
        if self.street_reached() < street {
            return false;
        }
        !self
            .actions
            .iter()
            .any(|a| a.actor == Actor::Hero && a.kind == ActionKind::Fold && a.street < street)
    }

    pub fn actions_on(&self, street: Street) -> Vec<&Action> {
        self.actions.iter().filter(|a| a.street == street).collect()
    }

    pub fn effective_stack_bb(&self) -> f64 {
        self.stacks.effective() / self.big_blind
    }

    fn preflop_raise_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.street == Street::Preflop && a.kind == ActionKind::Raise)
            .count()
    }

    pub fn pot_type(&self) -> PotType {
        match self.preflop_raise_count() {
            0 | 1 => PotType::SingleRaised,
            2 => PotType::ThreeBet,
            _ => PotType::FourBet,
        }
    }
}

/// Positional facts computed once per hand and passed down, instead of
/// re-deriving "is hero in position" at every street.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionContext {
    pub hero: Position,
    pub villain: Position,
    pub hero_in_position: bool,
    pub hero_preflop_aggressor: bool,
    pub pot_type: PotType,
}

impl PositionContext {
    pub fn from_record(record: &HandRecord) -> PositionContext {
        let last_preflop_raiser = record
            .actions
            .iter()
            .filter(|a| a.street == Street::Preflop && a.kind == ActionKind::Raise)
            .last()
            .map(|a| a.actor);
        PositionContext {
            hero: record.hero_position,
            villain: record.villain_position,
            hero_in_position: record.hero_position.acts_after(record.villain_position),
            hero_preflop_aggressor: last_preflop_raiser == Some(Actor::Hero),
            pot_type: record.pot_type(),
        }
    }
}
