use serde::{Deserialize, Serialize};

use crate::labels::{LabelKind, RiskTier};
use crate::risk::RiskScorer;
use crate::scenario::{ScenarioInputs, ScenarioOutcome, ScenarioValuator, ValuationScenario};
use crate::strategy::StrategyConfig;

const TRAP_PE: f64 = 10.0;
const TRAP_GROWTH: f64 = 2.0;
const OVERDRAFT_PEG: f64 = 3.0;
const OVERDRAFT_GROWTH: f64 = 15.0;
const ACCUMULATE_DISCOUNT: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: LabelKind,
    /// Nominally 0..=100, lower is safer; not clamped.
    pub risk_score: f64,
    pub scenario: ValuationScenario,
}

impl ClassificationResult {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.risk_score)
    }
}

pub struct LabelClassifier;

impl LabelClassifier {
    /// Run the scenario model, score it and label it.
    pub fn classify(
        inputs: &ScenarioInputs,
        current_price: f64,
        strategy: &StrategyConfig,
    ) -> ClassificationResult {
        match ScenarioValuator::value(inputs, strategy) {
            ScenarioOutcome::Unpriced { label, scenario } => ClassificationResult {
                label,
                risk_score: RiskScorer::unpriced_score(label),
                scenario,
            },
            ScenarioOutcome::Priced(scenario) => ClassificationResult {
                label: Self::label(&scenario, current_price),
                risk_score: RiskScorer::score(&scenario, current_price, inputs.return_on_equity),
                scenario,
            },
        }
    }

    /// First matching rule wins. Broken-growth checks run before any price band so
    /// that a statistically cheap price never masks a trap.
    pub fn label(scenario: &ValuationScenario, current_price: f64) -> LabelKind {
        let growth = scenario.applied_growth;

        if scenario.applied_pe < TRAP_PE && growth < TRAP_GROWTH {
            LabelKind::ValueTrap
        } else if scenario.peg_ratio > OVERDRAFT_PEG && growth < OVERDRAFT_GROWTH {
            LabelKind::ValuationOverdraft
        } else if current_price < scenario.bear_price {
            LabelKind::StrikeZone
        } else if current_price < scenario.base_price * ACCUMULATE_DISCOUNT {
            LabelKind::Accumulate
        } else if current_price > scenario.bull_price {
            LabelKind::Exuberance
        } else {
            LabelKind::FairHold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(pe: f64, growth: f64, peg: f64) -> ValuationScenario {
        ValuationScenario {
            bear_price: 80.0,
            base_price: 100.0,
            bull_price: 130.0,
            peg_ratio: peg,
            applied_pe: pe,
            applied_growth: growth,
        }
    }

    #[test]
    fn test_trap_boundary_is_strict() {
        assert_ne!(LabelClassifier::label(&scenario(10.0, 2.0, 1.0), 50.0), LabelKind::ValueTrap);
        assert_eq!(LabelClassifier::label(&scenario(9.99, 1.99, 1.0), 50.0), LabelKind::ValueTrap);
    }

    #[test]
    fn test_trap_beats_cheap_price() {
        // Price is far below bear, but the business is not growing.
        assert_eq!(LabelClassifier::label(&scenario(8.0, 1.0, 8.0), 10.0), LabelKind::ValueTrap);
    }

    #[test]
    fn test_overdraft_beats_cheap_price() {
        assert_eq!(
            LabelClassifier::label(&scenario(40.0, 10.0, 4.0), 10.0),
            LabelKind::ValuationOverdraft
        );
        // Fast growers are allowed a rich PEG.
        assert_eq!(
            LabelClassifier::label(&scenario(60.0, 15.0, 4.0), 10.0),
            LabelKind::StrikeZone
        );
    }

    #[test]
    fn test_price_bands() {
        let s = scenario(20.0, 10.0, 2.0);
        assert_eq!(LabelClassifier::label(&s, 79.0), LabelKind::StrikeZone);
        assert_eq!(LabelClassifier::label(&s, 94.0), LabelKind::Accumulate);
        assert_eq!(LabelClassifier::label(&s, 95.0), LabelKind::FairHold);
        assert_eq!(LabelClassifier::label(&s, 130.0), LabelKind::FairHold);
        assert_eq!(LabelClassifier::label(&s, 131.0), LabelKind::Exuberance);
    }

    #[test]
    fn test_classify_reference_example() {
        let inputs = ScenarioInputs {
            eps: Some(5.0),
            growth_rate: 8.0,
            pe_multiple: 20.0,
            risk_free_rate: 4.5,
            qtr_eps_growth: 0.0,
            past_growth: 0.0,
            return_on_equity: 10.0,
        };
        let result = LabelClassifier::classify(&inputs, 90.0, &StrategyConfig::default());
        assert_eq!(result.label, LabelKind::Accumulate);
        assert!(result.risk_score > 0.0 && result.risk_score < 100.0);
    }

    #[test]
    fn test_classify_unpriced() {
        let inputs = ScenarioInputs {
            eps: None,
            growth_rate: 5.0,
            pe_multiple: 20.0,
            risk_free_rate: 4.5,
            qtr_eps_growth: 0.0,
            past_growth: 0.0,
            return_on_equity: 0.0,
        };
        let result = LabelClassifier::classify(&inputs, 3.0, &StrategyConfig::default());
        assert_eq!(result.label, LabelKind::LossMaking);
        assert_eq!(result.risk_score, 99.0);
        assert_eq!(result.risk_tier(), RiskTier::HighVolatility);
    }
}
