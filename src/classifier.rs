use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::equity::pot_odds;
use crate::hand::{Action, ActionKind, Actor, HandRecord, Street};
use crate::range::Bucket;
use crate::spr::{snapshot_at, SprSnapshot};
use crate::strategy::{Branch, GtoOption, StrategyTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Optimal,
    Acceptable,
    Mistake,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeakCategory {
    SprAwareness,
    EquityMiscalculation,
    RangeAwareness,
    PostflopValue,
    PostflopBluff,
    PreflopMistake,
    FlopMistake,
    TurnMistake,
    RiverMistake,
}

impl LeakCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LeakCategory::SprAwareness => "spr_awareness",
            LeakCategory::EquityMiscalculation => "equity_miscalculation",
            LeakCategory::RangeAwareness => "range_awareness",
            LeakCategory::PostflopValue => "postflop_value",
            LeakCategory::PostflopBluff => "postflop_bluff",
            LeakCategory::PreflopMistake => "preflop_mistake",
            LeakCategory::FlopMistake => "flop_mistake",
            LeakCategory::TurnMistake => "turn_mistake",
            LeakCategory::RiverMistake => "river_mistake",
        }
    }
}

impl std::fmt::Display for LeakCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One graded hero decision. Produced only for decision points the hero
/// actually reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionClassification {
    pub street: Street,
    pub branch: Branch,
    pub hero_action: ActionKind,
    pub gto_primary: GtoOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gto_alternative: Option<GtoOption>,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leak_category: Option<LeakCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeakSummary {
    pub optimal: usize,
    pub acceptable: usize,
    pub mistakes: usize,
    pub leak_counts: BTreeMap<LeakCategory, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_leak: Option<LeakCategory>,
}

impl LeakSummary {
    pub fn from_classifications(classifications: &[DecisionClassification]) -> LeakSummary {
        let mut summary = LeakSummary::default();
        for c in classifications {
            match c.verdict {
                Verdict::Optimal => summary.optimal += 1,
                Verdict::Acceptable => summary.acceptable += 1,
                Verdict::Mistake => {
                    summary.mistakes += 1;
                    if let Some(leak) = c.leak_category {
                        *summary.leak_counts.entry(leak).or_insert(0) += 1;
                    }
                }
            }
        }
        summary.worst_leak = summary
            .leak_counts
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(leak, _)| *leak);
        summary
    }
}

/// Per-street context the leak chain consults.
pub struct ClassifierInputs<'a> {
    pub record: &'a HandRecord,
    pub tree: &'a StrategyTree,
    pub sprs: &'a [SprSnapshot],
    pub hero_buckets: &'a BTreeMap<Street, Bucket>,
    /// Hero's equity against villain's current range.
    pub hero_equity: f64,
    /// Hero's percentile within their own preflop range, 0.0 = strongest.
    pub hero_percentile: f64,
}

/// Walks the action sequence street by street and grades every hero action
/// against the strategy tree. Streets after a hero fold produce nothing.
pub fn classify_decisions(inputs: &ClassifierInputs) -> Vec<DecisionClassification> {
    let mut classifications = Vec::new();
    let mut folded = false;

    for street in crate::hand::ALL_STREETS {
        if folded || !inputs.record.hero_reached(street) {
            break;
        }
        let actions = inputs.record.actions_on(street);
        for (i, &action) in actions.iter().enumerate() {
            if action.actor != Actor::Hero {
                continue;
            }
            let branch = select_branch(&actions[..i]);
            let Some(node) = inputs.tree.get(street, branch) else {
                continue;
            };

            let verdict = grade(action.kind, &node.primary, node.alternative.as_ref());
            let leak_category = match verdict {
                Verdict::Mistake => Some(diagnose_leak(inputs, street, branch, action)),
                _ => None,
            };
            classifications.push(DecisionClassification {
                street,
                branch,
                hero_action: action.kind,
                gto_primary: node.primary.clone(),
                gto_alternative: node.alternative.clone(),
                verdict,
                leak_category,
            });

            if action.kind == ActionKind::Fold {
                folded = true;
                break;
            }
        }
        if folded {
            break;
        }
    }

    classifications
}

/// The villain's latest action before hero's turn picks the decision node.
fn select_branch(preceding: &[&Action]) -> Branch {
    let last_villain = preceding
        .iter()
        .rev()
        .find(|a| a.actor == Actor::Villain);
    match last_villain.map(|a| a.kind) {
        None => Branch::Initial,
        Some(ActionKind::Check) => Branch::VsCheck,
        Some(ActionKind::Bet) => Branch::VsBet,
        Some(ActionKind::Raise) => Branch::VsRaise,
        Some(ActionKind::Call) | Some(ActionKind::Fold) => Branch::Initial,
    }
}

fn grade(hero: ActionKind, primary: &GtoOption, alternative: Option<&GtoOption>) -> Verdict {
    if hero == primary.action {
        Verdict::Optimal
    } else if alternative.is_some_and(|alt| alt.action == hero && alt.action != primary.action) {
        Verdict::Acceptable
    } else {
        Verdict::Mistake
    }
}

const TOP_DECILE: f64 = 0.10;

/// Fixed priority chain; every mistake gets exactly one category.
fn diagnose_leak(
    inputs: &ClassifierInputs,
    street: Street,
    branch: Branch,
    action: &Action,
) -> LeakCategory {
    let bucket = inputs
        .hero_buckets
        .get(&street)
        .copied()
        .unwrap_or(Bucket::Air);

    if action.kind == ActionKind::Fold {
        let shove_zone = snapshot_at(inputs.sprs, street)
            .map(|s| s.commitment.shove_zone)
            .unwrap_or(false);
        if shove_zone {
            return LeakCategory::SprAwareness;
        }
        if fold_beats_pot_odds(inputs, street) {
            return LeakCategory::EquityMiscalculation;
        }
        if inputs.hero_percentile <= TOP_DECILE {
            return LeakCategory::RangeAwareness;
        }
    }

    if street != Street::Preflop {
        // Slow-playing is only a missed-value leak when hero opens the
        // betting; checking behind a villain check falls through.
        if action.kind == ActionKind::Check
            && branch == Branch::Initial
            && matches!(bucket, Bucket::Strong | Bucket::Monster)
        {
            return LeakCategory::PostflopValue;
        }
        if matches!(action.kind, ActionKind::Bet | ActionKind::Raise)
            && matches!(bucket, Bucket::DrawWeak | Bucket::Air)
        {
            return LeakCategory::PostflopBluff;
        }
    }

    match street {
        Street::Preflop => LeakCategory::PreflopMistake,
        Street::Flop => LeakCategory::FlopMistake,
        Street::Turn => LeakCategory::TurnMistake,
        Street::River => LeakCategory::RiverMistake,
    }
}

/// Hero folded facing a bet it had the equity to call.
fn fold_beats_pot_odds(inputs: &ClassifierInputs, street: Street) -> bool {
    let Some(pot) = inputs.record.pots.at(street) else {
        return false;
    };
    let facing_bet = inputs
        .record
        .actions_on(street)
        .iter()
        .rev()
        .find(|a| a.actor == Actor::Villain && a.kind.is_aggressive())
        .and_then(|a| a.amount);
    let Some(bet) = facing_bet else {
        return false;
    };
    match pot_odds(pot, bet) {
        Ok(needed) => inputs.hero_equity > needed,
        Err(_) => false,
    }
}
