use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::advantage::{BlockerReport, HeroSpot, NutAdvantage, RangeAdvantage};
use crate::classifier::{DecisionClassification, LeakSummary};
use crate::equity::{CallDecision, EquityEstimate};
use crate::hand::Street;
use crate::range::RangeStats;
use crate::spr::SprSnapshot;
use crate::strategy::StrategyTree;
use crate::texture::{BoardTexture, TextureNarrative};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSummary {
    pub narrative: TextureNarrative,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<BoardTexture>,
}

/// Hero's and villain's range snapshots after a street's action filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetRanges {
    pub hero: RangeStats,
    pub villain: RangeStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityAnalysis {
    pub estimate: EquityEstimate,
    /// Present when the final action facing hero was a bet or raise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<CallDecision>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvantageAnalysis {
    pub range: RangeAdvantage,
    pub nut: NutAdvantage,
    pub blockers: BlockerReport,
    /// Hero's concrete-holding read per street, flagging ahead/behind flips.
    pub hero_spots: Vec<HeroSpot>,
}

/// Which local fallbacks fired. All false means a full-quality analysis.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Degradation {
    pub texture_fallback: bool,
    pub strategy_fallback: bool,
    pub equity_heuristic: bool,
}

impl Degradation {
    pub fn any(&self) -> bool {
        self.texture_fallback || self.strategy_fallback || self.equity_heuristic
    }
}

/// Complete analysis for one hand. Always returned once input parsing
/// succeeds; external failures only degrade it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub board_summary: BoardSummary,
    pub ranges_per_street: BTreeMap<Street, StreetRanges>,
    pub equity_analysis: EquityAnalysis,
    pub advantage_analysis: AdvantageAnalysis,
    pub spr_analysis: Vec<SprSnapshot>,
    pub gto_strategy_tree: StrategyTree,
    pub decision_classifications: Vec<DecisionClassification>,
    pub leak_summary: LeakSummary,
    pub degradation: Degradation,
}
