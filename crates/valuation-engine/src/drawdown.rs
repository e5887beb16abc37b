use analysis_core::numeric::positive;
use serde::{Deserialize, Serialize};

use crate::labels::{DrawdownAction, DrawdownZone};
use crate::scenario::ValuationScenario;

/// Index trackers are valued on distance from their 52-week high, not on earnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownResult {
    /// Fraction below the high, negative when under it (-0.10 = 10% off).
    pub drawdown: f64,
    pub zone: DrawdownZone,
    pub risk_score: f64,
    pub action: DrawdownAction,
    /// 80/90/100% of the high so every row has the same three-price shape.
    pub scenario: ValuationScenario,
}

pub struct DrawdownAnalyzer;

impl DrawdownAnalyzer {
    pub fn analyze(current_price: f64, week52_high: Option<f64>) -> DrawdownResult {
        let (drawdown, scenario) = match positive(week52_high) {
            Some(high) => ((current_price - high) / high, ValuationScenario::reference(high)),
            // No high to measure from: treat as sitting at it.
            None => (0.0, ValuationScenario::reference(current_price)),
        };

        let zone = DrawdownZone::from_drawdown(drawdown);
        DrawdownResult {
            drawdown,
            zone,
            risk_score: zone.risk_score(),
            action: zone.action(),
            scenario,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ten_percent_off_is_accumulation() {
        let result = DrawdownAnalyzer::analyze(90.0, Some(100.0));
        assert_relative_eq!(result.drawdown, -0.10, epsilon = 1e-12);
        assert_eq!(result.zone, DrawdownZone::AccumulationZone);
        assert_eq!(result.action, DrawdownAction::Add);
    }

    #[test]
    fn test_reference_prices() {
        let result = DrawdownAnalyzer::analyze(95.0, Some(500.0));
        assert_relative_eq!(result.scenario.bear_price, 400.0);
        assert_relative_eq!(result.scenario.base_price, 450.0);
        assert_relative_eq!(result.scenario.bull_price, 500.0);
        assert_eq!(result.scenario.peg_ratio, 0.0);
    }

    #[test]
    fn test_deep_drawdown_is_all_in() {
        let result = DrawdownAnalyzer::analyze(70.0, Some(100.0));
        assert_eq!(result.zone, DrawdownZone::Panic);
        assert_eq!(result.action, DrawdownAction::AllIn);
        assert_eq!(result.risk_score, 5.0);
    }

    #[test]
    fn test_missing_high() {
        let result = DrawdownAnalyzer::analyze(420.0, None);
        assert_eq!(result.drawdown, 0.0);
        assert_eq!(result.zone, DrawdownZone::NearHighs);
        assert_eq!(result.action, DrawdownAction::Hold);
    }
}
