use analysis_core::numeric::{finite, finite_or, or_zero, positive};
use analysis_core::FundamentalSnapshot;
use serde::{Deserialize, Serialize};

use crate::growth::{GrowthEstimate, MAX_GROWTH_RATE};
use crate::labels::LabelKind;
use crate::strategy::{EngineConfig, StrategyConfig};

/// Above this estimated growth an EPS-less name is treated as a turnaround.
const DISTRESS_REVERSAL_GROWTH: f64 = 25.0;

/// Growth below which a rich multiple is not believed.
const LOW_GROWTH_THRESHOLD: f64 = 5.0;
const LOW_GROWTH_PE_CEILING: f64 = 15.0;
const LOW_GROWTH_PE: f64 = 12.0;

/// Quarterly EPS growth must beat the long-run rate by this much to count as acceleration.
const ACCELERATION_MARGIN: f64 = 15.0;
const ACCELERATION_BULL_BONUS: f64 = 0.3;
const ACCELERATION_GROWTH_WEIGHT: f64 = 0.8;

/// `pe * risk_free_rate` above this compresses every price.
const RATE_DRAG_THRESHOLD: f64 = 100.0;
const MIN_RATE_DRAG: f64 = 0.75;

const HIGH_QUALITY_ROE: f64 = 25.0;
const QUALITY_BEAR_BONUS: f64 = 0.15;

/// Inputs to one scenario run. All numbers are already sanitised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    /// Trailing EPS; `None` when missing or invalid.
    pub eps: Option<f64>,
    pub growth_rate: f64,
    pub pe_multiple: f64,
    pub risk_free_rate: f64,
    pub qtr_eps_growth: f64,
    pub past_growth: f64,
    pub return_on_equity: f64,
}

impl ScenarioInputs {
    pub fn from_snapshot(
        snapshot: &FundamentalSnapshot,
        growth: &GrowthEstimate,
        config: &EngineConfig,
    ) -> Self {
        Self {
            eps: finite(snapshot.eps_ttm),
            growth_rate: growth.rate,
            pe_multiple: positive(snapshot.pe_ttm).unwrap_or(config.default_pe),
            risk_free_rate: config
                .risk_free_rate_override
                .unwrap_or_else(|| snapshot.risk_free_rate()),
            qtr_eps_growth: or_zero(snapshot.eps_growth_quarterly_yoy),
            past_growth: or_zero(snapshot.eps_growth_5y),
            return_on_equity: or_zero(snapshot.roe_ttm),
        }
    }

    /// Same inputs with growth and multiple haircut for the stress re-run.
    pub fn stressed(&self, config: &EngineConfig) -> Self {
        Self {
            growth_rate: self.growth_rate * config.stress_growth_factor,
            pe_multiple: self.pe_multiple * config.stress_multiple_factor,
            ..*self
        }
    }
}

/// Bear/base/bull fair values plus the multiple and growth they were built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationScenario {
    pub bear_price: f64,
    pub base_price: f64,
    pub bull_price: f64,
    pub peg_ratio: f64,
    /// PE after the low-growth circuit breaker.
    pub applied_pe: f64,
    /// Growth after the cap and any acceleration uplift.
    pub applied_growth: f64,
}

impl ValuationScenario {
    fn unpriced(applied_pe: f64, applied_growth: f64) -> Self {
        Self {
            bear_price: 0.0,
            base_price: 0.0,
            bull_price: 0.0,
            peg_ratio: 0.0,
            applied_pe,
            applied_growth,
        }
    }

    /// Reference prices at 80/90/100% of a level, for instruments not priced on earnings.
    pub fn reference(level: f64) -> Self {
        Self {
            bear_price: level * 0.8,
            base_price: level * 0.9,
            bull_price: level,
            peg_ratio: 0.0,
            applied_pe: 0.0,
            applied_growth: 0.0,
        }
    }

    /// `bear <= base <= bull`. Fails for strongly negative growth.
    pub fn is_ordered(&self) -> bool {
        self.bear_price <= self.base_price && self.base_price <= self.bull_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScenarioOutcome {
    Priced(ValuationScenario),
    /// No earnings to put a multiple on; the label is decided here.
    Unpriced {
        label: LabelKind,
        scenario: ValuationScenario,
    },
}

impl ScenarioOutcome {
    pub fn scenario(&self) -> &ValuationScenario {
        match self {
            ScenarioOutcome::Priced(scenario) => scenario,
            ScenarioOutcome::Unpriced { scenario, .. } => scenario,
        }
    }
}

pub struct ScenarioValuator;

impl ScenarioValuator {
    pub fn value(inputs: &ScenarioInputs, strategy: &StrategyConfig) -> ScenarioOutcome {
        let mut growth = finite_or(inputs.growth_rate, 0.0).min(MAX_GROWTH_RATE);
        let mut pe = finite_or(inputs.pe_multiple, 0.0).max(0.0);

        let eps = match inputs.eps.filter(|eps| *eps > 0.0) {
            Some(eps) => eps,
            None => {
                let label = if growth > DISTRESS_REVERSAL_GROWTH {
                    LabelKind::DistressReversal
                } else {
                    LabelKind::LossMaking
                };
                return ScenarioOutcome::Unpriced {
                    label,
                    scenario: ValuationScenario::unpriced(pe, growth),
                };
            }
        };

        let mut bull_multiplier = strategy.bull_multiplier;
        let mut bear_discount = strategy.bear_discount;

        // A cheap-looking multiple on a stalled business is not a bargain.
        if growth < LOW_GROWTH_THRESHOLD && pe > LOW_GROWTH_PE_CEILING {
            pe = LOW_GROWTH_PE;
        }

        let qtr_eps_growth = finite_or(inputs.qtr_eps_growth, 0.0);
        if qtr_eps_growth > finite_or(inputs.past_growth, 0.0) + ACCELERATION_MARGIN {
            bull_multiplier += ACCELERATION_BULL_BONUS;
            growth = growth.max(qtr_eps_growth * ACCELERATION_GROWTH_WEIGHT);
        }

        let risk_free_rate = finite_or(inputs.risk_free_rate, 0.0);
        let rate_load = pe * risk_free_rate;
        let drag = if strategy.rate_drag && rate_load > RATE_DRAG_THRESHOLD {
            (RATE_DRAG_THRESHOLD / rate_load).sqrt().max(MIN_RATE_DRAG)
        } else {
            1.0
        };

        if finite_or(inputs.return_on_equity, 0.0) > HIGH_QUALITY_ROE {
            bear_discount += QUALITY_BEAR_BONUS;
        }

        let multiple = eps * pe * drag;
        ScenarioOutcome::Priced(ValuationScenario {
            bear_price: multiple * bear_discount * (1.0 + growth * 0.3 / 100.0),
            base_price: multiple * (1.0 + growth / 100.0),
            bull_price: multiple * bull_multiplier * (1.0 + growth * 1.3 / 100.0),
            peg_ratio: pe / growth.max(1.0),
            applied_pe: pe,
            applied_growth: growth,
        })
    }
}
