use serde::{Deserialize, Serialize};

use crate::hand::{PotSizes, Stacks, Street, ALL_STREETS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprZone {
    High,
    MediumHigh,
    Medium,
    Low,
    Committed,
}

impl SprZone {
    pub fn as_str(self) -> &'static str {
        match self {
            SprZone::High => "high",
            SprZone::MediumHigh => "medium_high",
            SprZone::Medium => "medium",
            SprZone::Low => "low",
            SprZone::Committed => "committed",
        }
    }
}

impl std::fmt::Display for SprZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative commitment flags derived from the ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Commitment {
    pub can_fold_top_pair: bool,
    pub can_fold_overpair: bool,
    pub shove_zone: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SprSnapshot {
    pub street: Street,
    pub pot: f64,
    pub stack_remaining: f64,
    pub spr: f64,
    pub zone: SprZone,
    pub commitment: Commitment,
}

fn classify(spr: f64) -> SprZone {
    if spr > 13.0 {
        SprZone::High
    } else if spr > 8.0 {
        SprZone::MediumHigh
    } else if spr > 4.0 {
        SprZone::Medium
    } else if spr >= 2.0 {
        SprZone::Low
    } else {
        SprZone::Committed
    }
}

fn commitment(spr: f64) -> Commitment {
    Commitment {
        can_fold_top_pair: spr > 4.0,
        can_fold_overpair: spr > 8.0,
        shove_zone: spr < 3.0,
    }
}

/// Per-street SPR accounting. The starting effective stack is min(hero,
/// villain); each street after the first deducts half the pot growth
/// (heads-up equal-split assumption). Streets with no pot entry were never
/// reached and produce no snapshot.
pub fn compute_spr(pots: &PotSizes, stacks: &Stacks) -> Vec<SprSnapshot> {
    let mut snapshots = Vec::new();
    let mut remaining = stacks.effective();
    let mut prev_pot: Option<f64> = None;

    for street in ALL_STREETS {
        let pot = match pots.at(street) {
            Some(p) if p > 0.0 => p,
            _ => continue,
        };
        if let Some(prev) = prev_pot {
            let invested = (pot - prev) / 2.0;
            remaining = (remaining - invested).max(0.0);
        }
        let spr = if pot > 0.0 { remaining / pot } else { 0.0 };
        snapshots.push(SprSnapshot {
            street,
            pot,
            stack_remaining: remaining,
            spr,
            zone: classify(spr),
            commitment: commitment(spr),
        });
        prev_pot = Some(pot);
    }

    snapshots
}

/// Snapshot for one street, if that street was reached.
pub fn snapshot_at(snapshots: &[SprSnapshot], street: Street) -> Option<&SprSnapshot> {
    snapshots.iter().find(|s| s.street == street)
}
