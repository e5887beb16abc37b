//! Discrete outputs of the engine.
//!
//! Every label has a stable `code()` used for storage and for the alert transition
//! check, plus display text per [`Locale`]. Nothing compares display text.

use std::str::FromStr;

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

use crate::locale::{Locale, Localized};

fn parse_code<T: Localized + Copy>(all: &[T], code: &str, kind: &str) -> Result<T, AnalysisError> {
    let code = code.trim();
    all.iter()
        .copied()
        .find(|label| label.code() == code)
        .ok_or_else(|| AnalysisError::InvalidData(format!("unknown {kind} code: {code}")))
}

/// Valuation conclusion for an equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// No earnings, but revenue momentum strong enough to bet on a turnaround.
    DistressReversal,
    /// No earnings and no momentum.
    LossMaking,
    /// Cheap multiple on a business that is not growing.
    ValueTrap,
    /// Price has run ahead of growth.
    ValuationOverdraft,
    /// Below the bear-case price.
    StrikeZone,
    /// Comfortably below the base-case price.
    Accumulate,
    /// Above the bull-case price.
    Exuberance,
    FairHold,
}

impl LabelKind {
    pub const ALL: [LabelKind; 8] = [
        LabelKind::DistressReversal,
        LabelKind::LossMaking,
        LabelKind::ValueTrap,
        LabelKind::ValuationOverdraft,
        LabelKind::StrikeZone,
        LabelKind::Accumulate,
        LabelKind::Exuberance,
        LabelKind::FairHold,
    ];

    /// Labels that confirm a timing breakout as a real entry.
    pub fn is_buy_zone(&self) -> bool {
        matches!(self, LabelKind::StrikeZone | LabelKind::Accumulate)
    }
}

impl Localized for LabelKind {
    fn code(&self) -> &'static str {
        match self {
            LabelKind::DistressReversal => "distress_reversal",
            LabelKind::LossMaking => "loss_making",
            LabelKind::ValueTrap => "value_trap",
            LabelKind::ValuationOverdraft => "valuation_overdraft",
            LabelKind::StrikeZone => "strike_zone",
            LabelKind::Accumulate => "accumulate",
            LabelKind::Exuberance => "exuberance",
            LabelKind::FairHold => "fair_hold",
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (LabelKind::DistressReversal, Locale::En) => "Distress Reversal",
            (LabelKind::DistressReversal, Locale::Zh) => "困境反转",
            (LabelKind::LossMaking, Locale::En) => "Loss-Making / Junk",
            (LabelKind::LossMaking, Locale::Zh) => "垃圾/亏损",
            (LabelKind::ValueTrap, Locale::En) => "Value Trap (Watch)",
            (LabelKind::ValueTrap, Locale::Zh) => "价值陷阱 (观望)",
            (LabelKind::ValuationOverdraft, Locale::En) => "Valuation Overdraft",
            (LabelKind::ValuationOverdraft, Locale::Zh) => "估值透支",
            (LabelKind::StrikeZone, Locale::En) => "Golden Strike Zone",
            (LabelKind::StrikeZone, Locale::Zh) => "黄金击球区",
            (LabelKind::Accumulate, Locale::En) => "Long Runway (Accumulate)",
            (LabelKind::Accumulate, Locale::Zh) => "长坡厚雪 (买入)",
            (LabelKind::Exuberance, Locale::En) => "Irrational Exuberance (Reduce)",
            (LabelKind::Exuberance, Locale::Zh) => "非理性繁荣 (减仓)",
            (LabelKind::FairHold, Locale::En) => "Fair Range (Hold)",
            (LabelKind::FairHold, Locale::Zh) => "合理区间 (持有)",
        }
    }
}

impl FromStr for LabelKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_code(&Self::ALL, s, "valuation label")
    }
}

/// Entry timing read off the 52-week range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingKind {
    /// Pinned to the 52-week low: catching a falling price.
    LeftSideEntry,
    /// Early rebound off the low, backed by a buy-zone valuation.
    RightSideBreakout,
    /// Same rebound without valuation support.
    BottomRebound,
    Elevated,
    MidRange,
    RangeBound,
}

impl TimingKind {
    pub const ALL: [TimingKind; 6] = [
        TimingKind::LeftSideEntry,
        TimingKind::RightSideBreakout,
        TimingKind::BottomRebound,
        TimingKind::Elevated,
        TimingKind::MidRange,
        TimingKind::RangeBound,
    ];
}

impl Localized for TimingKind {
    fn code(&self) -> &'static str {
        match self {
            TimingKind::LeftSideEntry => "left_side_entry",
            TimingKind::RightSideBreakout => "right_side_breakout",
            TimingKind::BottomRebound => "bottom_rebound",
            TimingKind::Elevated => "elevated",
            TimingKind::MidRange => "mid_range",
            TimingKind::RangeBound => "range_bound",
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (TimingKind::LeftSideEntry, Locale::En) => "Left-Side Contrarian Entry",
            (TimingKind::LeftSideEntry, Locale::Zh) => "左侧博弈 (接飞刀)",
            (TimingKind::RightSideBreakout, Locale::En) => "Right-Side Breakout (Best Entry)",
            (TimingKind::RightSideBreakout, Locale::Zh) => "右侧启动 (最佳买点)",
            (TimingKind::BottomRebound, Locale::En) => "Bottom Rebound",
            (TimingKind::BottomRebound, Locale::Zh) => "底部反弹",
            (TimingKind::Elevated, Locale::En) => "Elevated (Trim Zone)",
            (TimingKind::Elevated, Locale::Zh) => "高位运行",
            (TimingKind::MidRange, Locale::En) => "Mid-Range Consolidation",
            (TimingKind::MidRange, Locale::Zh) => "鱼身盘整",
            (TimingKind::RangeBound, Locale::En) => "Range-Bound",
            (TimingKind::RangeBound, Locale::Zh) => "盘整中",
        }
    }
}

impl FromStr for TimingKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_code(&Self::ALL, s, "timing label")
    }
}

/// Text bucket for a risk score. Lower score means more margin of safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    VerySafeMargin,
    AmpleMargin,
    Moderate,
    Fragile,
    HighVolatility,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::VerySafeMargin,
        RiskTier::AmpleMargin,
        RiskTier::Moderate,
        RiskTier::Fragile,
        RiskTier::HighVolatility,
    ];

    /// Upper bounds are inclusive: a score of exactly 20 is still very safe.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s <= 20.0 => RiskTier::VerySafeMargin,
            s if s <= 40.0 => RiskTier::AmpleMargin,
            s if s <= 60.0 => RiskTier::Moderate,
            s if s <= 80.0 => RiskTier::Fragile,
            _ => RiskTier::HighVolatility,
        }
    }
}

impl Localized for RiskTier {
    fn code(&self) -> &'static str {
        match self {
            RiskTier::VerySafeMargin => "very_safe_margin",
            RiskTier::AmpleMargin => "ample_margin",
            RiskTier::Moderate => "moderate",
            RiskTier::Fragile => "fragile",
            RiskTier::HighVolatility => "high_volatility",
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (RiskTier::VerySafeMargin, Locale::En) => "Very Safe Margin",
            (RiskTier::VerySafeMargin, Locale::Zh) => "边际极高",
            (RiskTier::AmpleMargin, Locale::En) => "Ample Margin",
            (RiskTier::AmpleMargin, Locale::Zh) => "边际充足",
            (RiskTier::Moderate, Locale::En) => "Moderate Risk",
            (RiskTier::Moderate, Locale::Zh) => "风险适中",
            (RiskTier::Fragile, Locale::En) => "Fragile Valuation",
            (RiskTier::Fragile, Locale::Zh) => "估值脆弱",
            (RiskTier::HighVolatility, Locale::En) => "High Volatility",
            (RiskTier::HighVolatility, Locale::Zh) => "高波动",
        }
    }
}

/// Drawdown bucket for an index tracker, shallow to deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawdownZone {
    NearHighs,
    HealthyPullback,
    AccumulationZone,
    BearMarket,
    Panic,
}

impl DrawdownZone {
    pub const ALL: [DrawdownZone; 5] = [
        DrawdownZone::NearHighs,
        DrawdownZone::HealthyPullback,
        DrawdownZone::AccumulationZone,
        DrawdownZone::BearMarket,
        DrawdownZone::Panic,
    ];

    /// `drawdown` is a fraction, negative below the high (-0.10 = 10% off).
    pub fn from_drawdown(drawdown: f64) -> Self {
        match drawdown {
            d if d > -0.03 => DrawdownZone::NearHighs,
            d if d > -0.08 => DrawdownZone::HealthyPullback,
            d if d > -0.15 => DrawdownZone::AccumulationZone,
            d if d > -0.25 => DrawdownZone::BearMarket,
            _ => DrawdownZone::Panic,
        }
    }

    pub fn risk_score(&self) -> f64 {
        match self {
            DrawdownZone::NearHighs => 80.0,
            DrawdownZone::HealthyPullback => 60.0,
            DrawdownZone::AccumulationZone => 40.0,
            DrawdownZone::BearMarket => 20.0,
            DrawdownZone::Panic => 5.0,
        }
    }

    pub fn action(&self) -> DrawdownAction {
        match self {
            DrawdownZone::NearHighs => DrawdownAction::Hold,
            DrawdownZone::HealthyPullback | DrawdownZone::AccumulationZone => DrawdownAction::Add,
            DrawdownZone::BearMarket => DrawdownAction::HeavyAdd,
            DrawdownZone::Panic => DrawdownAction::AllIn,
        }
    }
}

impl Localized for DrawdownZone {
    fn code(&self) -> &'static str {
        match self {
            DrawdownZone::NearHighs => "near_highs",
            DrawdownZone::HealthyPullback => "healthy_pullback",
            DrawdownZone::AccumulationZone => "accumulation_zone",
            DrawdownZone::BearMarket => "bear_market",
            DrawdownZone::Panic => "panic",
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (DrawdownZone::NearHighs, Locale::En) => "Near Highs (Trend-Follow Only)",
            (DrawdownZone::NearHighs, Locale::Zh) => "接近高点 (仅顺势)",
            (DrawdownZone::HealthyPullback, Locale::En) => "Healthy Pullback",
            (DrawdownZone::HealthyPullback, Locale::Zh) => "健康回调",
            (DrawdownZone::AccumulationZone, Locale::En) => "Accumulation Zone",
            (DrawdownZone::AccumulationZone, Locale::Zh) => "积累区间",
            (DrawdownZone::BearMarket, Locale::En) => "Bear-Market Territory",
            (DrawdownZone::BearMarket, Locale::Zh) => "熊市区域",
            (DrawdownZone::Panic, Locale::En) => "Panic (Maximum Opportunity)",
            (DrawdownZone::Panic, Locale::Zh) => "恐慌 (最大机会)",
        }
    }
}

impl FromStr for DrawdownZone {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_code(&Self::ALL, s, "drawdown zone")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawdownAction {
    Hold,
    Add,
    HeavyAdd,
    AllIn,
}

impl Localized for DrawdownAction {
    fn code(&self) -> &'static str {
        match self {
            DrawdownAction::Hold => "hold",
            DrawdownAction::Add => "add",
            DrawdownAction::HeavyAdd => "heavy_add",
            DrawdownAction::AllIn => "all_in",
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (DrawdownAction::Hold, Locale::En) => "Hold",
            (DrawdownAction::Hold, Locale::Zh) => "持有",
            (DrawdownAction::Add, Locale::En) => "Add",
            (DrawdownAction::Add, Locale::Zh) => "加仓",
            (DrawdownAction::HeavyAdd, Locale::En) => "Heavy Add",
            (DrawdownAction::HeavyAdd, Locale::Zh) => "重仓加码",
            (DrawdownAction::AllIn, Locale::En) => "All In",
            (DrawdownAction::AllIn, Locale::Zh) => "满仓",
        }
    }
}
