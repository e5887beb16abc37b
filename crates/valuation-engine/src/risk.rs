use analysis_core::numeric::finite_or;

use crate::labels::LabelKind;
use crate::scenario::ValuationScenario;

const VALUATION_WEIGHT: f64 = 50.0;
const QUALITY_CAP: f64 = 30.0;
const GROWTH_QUALITY_WEIGHT: f64 = 20.0;

/// Composite risk: 100 minus valuation, quality and growth-quality credits.
///
/// Lower is safer. The result is not clamped; each credit is bounded, so priced
/// scenarios land in 0..=100, and the unpriced labels carry fixed scores.
pub struct RiskScorer;

impl RiskScorer {
    pub fn score(scenario: &ValuationScenario, current_price: f64, return_on_equity: f64) -> f64 {
        let valuation = Self::valuation_credit(scenario, current_price);
        let quality = finite_or(return_on_equity, 0.0).clamp(0.0, QUALITY_CAP);
        let growth_quality = Self::growth_quality_credit(scenario.peg_ratio);

        100.0 - (valuation + quality + growth_quality)
    }

    /// Fixed scores for names with no earnings to value.
    pub fn unpriced_score(label: LabelKind) -> f64 {
        match label {
            LabelKind::DistressReversal => 40.0,
            _ => 99.0,
        }
    }

    /// 50 below the bear price, 0 above the bull price, linear in between.
    fn valuation_credit(scenario: &ValuationScenario, price: f64) -> f64 {
        let (bear, bull) = (scenario.bear_price, scenario.bull_price);
        if price < bear {
            VALUATION_WEIGHT
        } else if price > bull {
            0.0
        } else if bull > bear {
            VALUATION_WEIGHT * (1.0 - (price - bear) / (bull - bear))
        } else {
            // Zero-width band: price sits exactly on it.
            VALUATION_WEIGHT / 2.0
        }
    }

    /// 20 when PEG < 1, 0 when PEG > 3, linear in between.
    fn growth_quality_credit(peg: f64) -> f64 {
        if peg < 1.0 {
            GROWTH_QUALITY_WEIGHT
        } else if peg > 3.0 {
            0.0
        } else {
            GROWTH_QUALITY_WEIGHT * (3.0 - peg) / 2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario(bear: f64, bull: f64, peg: f64) -> ValuationScenario {
        ValuationScenario {
            bear_price: bear,
            base_price: (bear + bull) / 2.0,
            bull_price: bull,
            peg_ratio: peg,
            applied_pe: 20.0,
            applied_growth: 10.0,
        }
    }

    #[test]
    fn test_cheap_quality_growth_is_safest() {
        let s = scenario(80.0, 130.0, 0.8);
        assert_relative_eq!(RiskScorer::score(&s, 70.0, 40.0), 0.0);
    }

    #[test]
    fn test_expensive_weak_is_riskiest() {
        let s = scenario(80.0, 130.0, 4.0);
        assert_relative_eq!(RiskScorer::score(&s, 150.0, -5.0), 100.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let s = scenario(80.0, 120.0, 2.0);
        // valuation 25, quality 10, growth quality 10
        assert_relative_eq!(RiskScorer::score(&s, 100.0, 10.0), 55.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_width_band_does_not_divide_by_zero() {
        let s = scenario(0.0, 0.0, 0.0);
        let score = RiskScorer::score(&s, 0.0, 0.0);
        assert!(score.is_finite());
        assert_relative_eq!(score, 55.0);
    }

    #[test]
    fn test_unpriced_scores() {
        assert_eq!(RiskScorer::unpriced_score(LabelKind::DistressReversal), 40.0);
        assert_eq!(RiskScorer::unpriced_score(LabelKind::LossMaking), 99.0);
    }
}
