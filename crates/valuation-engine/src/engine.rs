use analysis_core::{AnalysisError, FundamentalSnapshot, InstrumentClass};
use serde::{Deserialize, Serialize};

use crate::alert::{AlertDecision, AlertStateTracker, Conclusion, LabelState};
use crate::classifier::{ClassificationResult, LabelClassifier};
use crate::drawdown::{DrawdownAnalyzer, DrawdownResult};
use crate::growth::{GrowthEstimate, GrowthEstimator};
use crate::labels::{RiskTier, TimingKind};
use crate::scenario::{ScenarioInputs, ValuationScenario};
use crate::strategy::EngineConfig;
use crate::timing::{TimingAnalyzer, TimingResult};

/// What the engine concluded, by pricing path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    Equity {
        growth: GrowthEstimate,
        /// Earnings multiple fed to the model, the default when the feed has none.
        pe_multiple: f64,
        normal: ClassificationResult,
        /// Same model with growth and multiple haircut.
        stressed: ClassificationResult,
        timing: TimingResult,
    },
    IndexTracker {
        drawdown: DrawdownResult,
    },
}

/// One symbol's full evaluation. Depends only on the engine config and the inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub symbol: String,
    pub instrument: InstrumentClass,
    pub current_price: f64,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn conclusion(&self) -> Conclusion {
        match &self.verdict {
            Verdict::Equity { normal, .. } => Conclusion::Valuation(normal.label),
            Verdict::IndexTracker { drawdown } => Conclusion::Drawdown(drawdown.zone),
        }
    }

    /// Conclusion under the stress haircut. Drawdown pricing has no multiple to stress.
    pub fn stressed_conclusion(&self) -> Conclusion {
        match &self.verdict {
            Verdict::Equity { stressed, .. } => Conclusion::Valuation(stressed.label),
            Verdict::IndexTracker { drawdown } => Conclusion::Drawdown(drawdown.zone),
        }
    }

    pub fn timing(&self) -> Option<&TimingResult> {
        match &self.verdict {
            Verdict::Equity { timing, .. } => Some(timing),
            Verdict::IndexTracker { .. } => None,
        }
    }

    pub fn pe_multiple(&self) -> Option<f64> {
        match &self.verdict {
            Verdict::Equity { pe_multiple, .. } => Some(*pe_multiple),
            Verdict::IndexTracker { .. } => None,
        }
    }

    pub fn risk_score(&self) -> f64 {
        match &self.verdict {
            Verdict::Equity { normal, .. } => normal.risk_score,
            Verdict::IndexTracker { drawdown } => drawdown.risk_score,
        }
    }

    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.risk_score())
    }

    pub fn scenario(&self) -> &ValuationScenario {
        match &self.verdict {
            Verdict::Equity { normal, .. } => &normal.scenario,
            Verdict::IndexTracker { drawdown } => &drawdown.scenario,
        }
    }

    /// Labels to persist and to compare against on the next run.
    pub fn label_state(&self) -> LabelState {
        LabelState {
            conclusion: Some(self.conclusion()),
            timing: self.timing().map(|t| t.label),
        }
    }

    pub fn alert_decision(&self, previous: &LabelState) -> AlertDecision {
        AlertStateTracker::decide(previous, &self.label_state())
    }

    pub fn timing_label(&self) -> Option<TimingKind> {
        self.timing().map(|t| t.label)
    }
}

/// Stateless valuation pipeline: growth, scenarios, risk, labels, timing.
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl ValuationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one symbol. Callers skip snapshots that fail
    /// [`FundamentalSnapshot::validate`]; every other input is handled.
    pub fn evaluate(
        &self,
        symbol: &str,
        snapshot: &FundamentalSnapshot,
        instrument: InstrumentClass,
    ) -> Evaluation {
        let price = snapshot.current_price;

        let verdict = match instrument {
            InstrumentClass::IndexTracker => Verdict::IndexTracker {
                drawdown: DrawdownAnalyzer::analyze(price, snapshot.week52_high),
            },
            InstrumentClass::Equity => {
                let growth = GrowthEstimator::estimate(snapshot);
                let inputs = ScenarioInputs::from_snapshot(snapshot, &growth, &self.config);
                let strategy = &self.config.strategy;

                let normal = LabelClassifier::classify(&inputs, price, strategy);
                let stressed =
                    LabelClassifier::classify(&inputs.stressed(&self.config), price, strategy);
                let timing = TimingAnalyzer::analyze(
                    price,
                    snapshot.week52_low,
                    snapshot.week52_high,
                    normal.label,
                );

                if !normal.scenario.is_ordered() {
                    tracing::debug!(
                        "{}: scenario prices out of order (bear {:.2}, base {:.2}, bull {:.2})",
                        symbol,
                        normal.scenario.bear_price,
                        normal.scenario.base_price,
                        normal.scenario.bull_price
                    );
                }

                Verdict::Equity {
                    growth,
                    pe_multiple: inputs.pe_multiple,
                    normal,
                    stressed,
                    timing,
                }
            }
        };

        let evaluation = Evaluation {
            symbol: symbol.to_string(),
            instrument,
            current_price: price,
            verdict,
        };

        tracing::debug!(
            "{} ({}) -> {:?}, risk {:.1}",
            symbol,
            instrument.name(),
            evaluation.conclusion(),
            evaluation.risk_score()
        );

        evaluation
    }
}
