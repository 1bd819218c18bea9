use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::hand_strength_index;
use crate::error::{CoachError, CoachResult};
use crate::hand::{ActionKind, PositionContext, Street};
use crate::range::Bucket;
use crate::spr::{snapshot_at, SprSnapshot};

/// Where in the street's action sequence a decision sits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Initial,
    VsCheck,
    VsBet,
    VsRaise,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Initial => "initial",
            Branch::VsCheck => "vs_check",
            Branch::VsBet => "vs_bet",
            Branch::VsRaise => "vs_raise",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GtoOption {
    pub action: ActionKind,
    pub frequency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<String>,
}

/// A mixed-strategy recommendation: a dominant action plus an optional
/// secondary action taken at lower frequency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionNode {
    pub primary: GtoOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<GtoOption>,
}

impl DecisionNode {
    pub fn pure(action: ActionKind) -> DecisionNode {
        DecisionNode {
            primary: GtoOption {
                action,
                frequency: 1.0,
                sizing: None,
            },
            alternative: None,
        }
    }

    pub fn mixed(
        primary: ActionKind,
        primary_freq: f64,
        sizing: Option<&str>,
        alternative: ActionKind,
        alternative_freq: f64,
    ) -> DecisionNode {
        DecisionNode {
            primary: GtoOption {
                action: primary,
                frequency: primary_freq,
                sizing: sizing.map(|s| s.to_string()),
            },
            alternative: Some(GtoOption {
                action: alternative,
                frequency: alternative_freq,
                sizing: None,
            }),
        }
    }

    /// Clamps frequencies to [0, 1] and keeps the dominant action primary.
    fn normalize(&mut self) {
        self.primary.frequency = self.primary.frequency.clamp(0.0, 1.0);
        if let Some(alt) = self.alternative.as_mut() {
            alt.frequency = alt.frequency.clamp(0.0, 1.0);
            if alt.frequency > self.primary.frequency {
                std::mem::swap(&mut self.primary, alt);
            }
        }
    }
}

/// GTO decision nodes keyed by street and branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyTree {
    pub streets: BTreeMap<Street, BTreeMap<Branch, DecisionNode>>,
}

impl StrategyTree {
    pub fn get(&self, street: Street, branch: Branch) -> Option<&DecisionNode> {
        self.streets.get(&street).and_then(|b| b.get(&branch))
    }

    pub fn insert(&mut self, street: Street, branch: Branch, node: DecisionNode) {
        self.streets.entry(street).or_default().insert(branch, node);
    }

    pub fn normalize(&mut self) {
        for branches in self.streets.values_mut() {
            for node in branches.values_mut() {
                node.normalize();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

/// Parses the narrator's strategy output. Tolerates markdown code fences;
/// anything else unparsable is an external-service error for the fallback
/// wrapper to absorb.
pub fn parse_llm_tree(text: &str) -> CoachResult<StrategyTree> {
    let cleaned = strip_code_fences(text);
    let mut tree: StrategyTree = serde_json::from_str(cleaned)?;
    if tree.is_empty() {
        return Err(CoachError::ExternalService(
            "strategy response contained no decision nodes".to_string(),
        ));
    }
    tree.normalize();
    Ok(tree)
}

pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

/// Everything the deterministic generator needs from Tiers 1-3.
pub struct FallbackInputs<'a> {
    pub ctx: &'a PositionContext,
    pub hero_class: &'a str,
    /// Hero's bucket per street actually reached.
    pub hero_buckets: &'a BTreeMap<Street, Bucket>,
    pub sprs: &'a [SprSnapshot],
    pub streets_reached: &'a [Street],
}

/// Deterministic strategy tree used when the external strategy call fails.
/// Built from hero's bucket, the SPR zone, and position.
pub fn fallback_tree(inputs: &FallbackInputs) -> StrategyTree {
    let mut tree = StrategyTree::default();

    for &street in inputs.streets_reached {
        if street == Street::Preflop {
            preflop_nodes(&mut tree, inputs);
            continue;
        }
        let bucket = inputs
            .hero_buckets
            .get(&street)
            .copied()
            .unwrap_or(Bucket::Air);
        let shove_zone = snapshot_at(inputs.sprs, street)
            .map(|s| s.commitment.shove_zone)
            .unwrap_or(false);
        postflop_nodes(&mut tree, street, bucket, shove_zone);
    }

    tree.normalize();
    tree
}

fn preflop_nodes(tree: &mut StrategyTree, inputs: &FallbackInputs) {
    let idx = hand_strength_index(inputs.hero_class);

    // First-in decision from the strength ordering; the hero's seat widens
    // the threshold from early position to the button.
    let open_threshold = match inputs.ctx.hero {
        crate::hand::Position::Utg => 36,
        crate::hand::Position::Hj => 44,
        crate::hand::Position::Co => 60,
        crate::hand::Position::Btn => 90,
        crate::hand::Position::Sb => 75,
        crate::hand::Position::Bb => 90,
    };
    let initial = if idx < open_threshold / 3 {
        DecisionNode::mixed(ActionKind::Raise, 0.9, Some("2.5bb"), ActionKind::Call, 0.1)
    } else if idx < open_threshold {
        DecisionNode::mixed(ActionKind::Raise, 0.7, Some("2.5bb"), ActionKind::Fold, 0.3)
    } else {
        DecisionNode::pure(ActionKind::Fold)
    };
    tree.insert(Street::Preflop, Branch::Initial, initial);

    // Facing a raise: premium re-raises, playable calls, the rest folds.
    let vs_raise = if idx < 8 {
        DecisionNode::mixed(ActionKind::Raise, 0.8, Some("3x"), ActionKind::Call, 0.2)
    } else if idx < 40 {
        DecisionNode::mixed(ActionKind::Call, 0.7, None, ActionKind::Fold, 0.3)
    } else {
        DecisionNode::pure(ActionKind::Fold)
    };
    tree.insert(Street::Preflop, Branch::VsRaise, vs_raise);
}

fn postflop_nodes(tree: &mut StrategyTree, street: Street, bucket: Bucket, shove_zone: bool) {
    let value_sizing = if shove_zone { "all-in" } else { "66% pot" };

    let (initial, vs_check, vs_bet, vs_raise) = match bucket {
        Bucket::Monster => (
            DecisionNode::mixed(ActionKind::Bet, 0.75, Some(value_sizing), ActionKind::Check, 0.25),
            DecisionNode::mixed(ActionKind::Bet, 0.85, Some(value_sizing), ActionKind::Check, 0.15),
            DecisionNode::mixed(ActionKind::Raise, 0.6, Some(value_sizing), ActionKind::Call, 0.4),
            DecisionNode::mixed(ActionKind::Raise, 0.55, Some(value_sizing), ActionKind::Call, 0.45),
        ),
        Bucket::Strong => (
            DecisionNode::mixed(ActionKind::Bet, 0.65, Some(value_sizing), ActionKind::Check, 0.35),
            DecisionNode::mixed(ActionKind::Bet, 0.7, Some(value_sizing), ActionKind::Check, 0.3),
            DecisionNode::mixed(ActionKind::Call, 0.65, None, ActionKind::Raise, 0.35),
            if shove_zone {
                DecisionNode::mixed(ActionKind::Call, 0.7, None, ActionKind::Raise, 0.3)
            } else {
                DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Fold, 0.4)
            },
        ),
        Bucket::Marginal => (
            DecisionNode::mixed(ActionKind::Check, 0.6, None, ActionKind::Bet, 0.4),
            DecisionNode::mixed(ActionKind::Check, 0.6, None, ActionKind::Bet, 0.4),
            DecisionNode::mixed(ActionKind::Call, 0.55, None, ActionKind::Fold, 0.45),
            DecisionNode::mixed(ActionKind::Fold, 0.7, None, ActionKind::Call, 0.3),
        ),
        Bucket::DrawStrong => (
            DecisionNode::mixed(ActionKind::Bet, 0.5, Some("50% pot"), ActionKind::Check, 0.5),
            DecisionNode::mixed(ActionKind::Bet, 0.55, Some("50% pot"), ActionKind::Check, 0.45),
            DecisionNode::mixed(ActionKind::Call, 0.7, None, ActionKind::Raise, 0.3),
            DecisionNode::mixed(ActionKind::Call, 0.6, None, ActionKind::Fold, 0.4),
        ),
        Bucket::DrawWeak => (
            DecisionNode::mixed(ActionKind::Check, 0.7, None, ActionKind::Bet, 0.3),
            DecisionNode::mixed(ActionKind::Check, 0.65, None, ActionKind::Bet, 0.35),
            DecisionNode::mixed(ActionKind::Fold, 0.55, None, ActionKind::Call, 0.45),
            DecisionNode::pure(ActionKind::Fold),
        ),
        Bucket::Air => (
            DecisionNode::mixed(ActionKind::Check, 0.65, None, ActionKind::Bet, 0.35),
            DecisionNode::mixed(ActionKind::Check, 0.7, None, ActionKind::Bet, 0.3),
            DecisionNode::mixed(ActionKind::Fold, 0.8, None, ActionKind::Raise, 0.2),
            DecisionNode::pure(ActionKind::Fold),
        ),
    };

    tree.insert(street, Branch::Initial, initial);
    tree.insert(street, Branch::VsCheck, vs_check);
    tree.insert(street, Branch::VsBet, vs_bet);
    tree.insert(street, Branch::VsRaise, vs_raise);
}
