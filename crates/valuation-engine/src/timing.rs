use analysis_core::numeric::finite;
use serde::{Deserialize, Serialize};

use crate::labels::{LabelKind, TimingKind};

const BOTTOM_POSITION: f64 = 0.05;
const REBOUND_MIN: f64 = 0.05;
const REBOUND_MAX: f64 = 0.20;
const ELEVATED_POSITION: f64 = 0.8;
const MID_RANGE: (f64, f64) = (0.4, 0.6);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingResult {
    pub label: TimingKind,
    pub rationale: String,
}

/// Reads entry timing off where the price sits in its 52-week range.
pub struct TimingAnalyzer;

impl TimingAnalyzer {
    pub fn analyze(
        current_price: f64,
        week52_low: Option<f64>,
        week52_high: Option<f64>,
        valuation: LabelKind,
    ) -> TimingResult {
        let range = match (finite(week52_low), finite(week52_high)) {
            (Some(low), Some(high)) if low > 0.0 && high > low => Some((low, high)),
            _ => None,
        };
        let Some((low, high)) = range else {
            return TimingResult {
                label: TimingKind::RangeBound,
                rationale: "52-week range unavailable".to_string(),
            };
        };

        let position = (current_price - low) / (high - low);
        let rebound = (current_price - low) / low;

        let (label, rationale) = if position < BOTTOM_POSITION {
            (
                TimingKind::LeftSideEntry,
                format!("Trading at {:.0}% of the 52-week range, still falling", position * 100.0),
            )
        } else if rebound > REBOUND_MIN && rebound < REBOUND_MAX {
            if valuation.is_buy_zone() {
                (
                    TimingKind::RightSideBreakout,
                    format!("Up {:.1}% off the low with valuation support", rebound * 100.0),
                )
            } else {
                (
                    TimingKind::BottomRebound,
                    format!("Up {:.1}% off the low without valuation support", rebound * 100.0),
                )
            }
        } else if position > ELEVATED_POSITION {
            (
                TimingKind::Elevated,
                format!("Trading at {:.0}% of the 52-week range", position * 100.0),
            )
        } else if position > MID_RANGE.0 && position < MID_RANGE.1 {
            (
                TimingKind::MidRange,
                format!("Mid-range at {:.0}% of the 52-week range", position * 100.0),
            )
        } else {
            (
                TimingKind::RangeBound,
                format!("No edge at {:.0}% of the 52-week range", position * 100.0),
            )
        };

        TimingResult { label, rationale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(price: f64, label: LabelKind) -> TimingKind {
        TimingAnalyzer::analyze(price, Some(100.0), Some(200.0), label).label
    }

    #[test]
    fn test_near_low_is_left_side() {
        assert_eq!(timing(103.0, LabelKind::StrikeZone), TimingKind::LeftSideEntry);
    }

    #[test]
    fn test_rebound_needs_valuation_support() {
        assert_eq!(timing(110.0, LabelKind::StrikeZone), TimingKind::RightSideBreakout);
        assert_eq!(timing(110.0, LabelKind::Accumulate), TimingKind::RightSideBreakout);
        assert_eq!(timing(110.0, LabelKind::FairHold), TimingKind::BottomRebound);
        assert_eq!(timing(110.0, LabelKind::ValueTrap), TimingKind::BottomRebound);
    }

    #[test]
    fn test_rebound_band_is_open() {
        // 5% rebound is exactly the left edge; position 0.05 is not below 0.05 either.
        assert_eq!(timing(105.0, LabelKind::StrikeZone), TimingKind::RangeBound);
        // 20% rebound is exactly the right edge.
        assert_eq!(timing(120.0, LabelKind::StrikeZone), TimingKind::RangeBound);
    }

    #[test]
    fn test_upper_range() {
        assert_eq!(timing(190.0, LabelKind::FairHold), TimingKind::Elevated);
        assert_eq!(timing(150.0, LabelKind::FairHold), TimingKind::MidRange);
        assert_eq!(timing(170.0, LabelKind::FairHold), TimingKind::RangeBound);
    }

    #[test]
    fn test_missing_range() {
        let result = TimingAnalyzer::analyze(50.0, None, Some(80.0), LabelKind::StrikeZone);
        assert_eq!(result.label, TimingKind::RangeBound);

        let inverted = TimingAnalyzer::analyze(50.0, Some(80.0), Some(60.0), LabelKind::StrikeZone);
        assert_eq!(inverted.label, TimingKind::RangeBound);

        let zero_low = TimingAnalyzer::analyze(50.0, Some(0.0), Some(60.0), LabelKind::StrikeZone);
        assert_eq!(zero_low.label, TimingKind::RangeBound);
    }

    #[test]
    fn test_rationale_is_populated() {
        let result = TimingAnalyzer::analyze(110.0, Some(100.0), Some(200.0), LabelKind::StrikeZone);
        assert!(result.rationale.contains("10.0%"));
    }
}
