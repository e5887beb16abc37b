use analysis_core::numeric::{finite, percent_to_fraction, round_to};
use analysis_core::FundamentalSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use valuation_engine::{
    Conclusion, Evaluation, LabelState, Locale, Localized, TimingKind, Verdict,
};

/// One persisted row per symbol, overwritten on every run.
///
/// Percent-unit inputs are stored as fractions. The `*_code` columns hold stable
/// enum codes so the next run can rebuild the previous labels without reading
/// display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ValuationRecord {
    pub symbol: String,
    pub instrument: String,
    pub current_price: f64,
    pub peg_ratio: f64,
    pub conclusion_code: String,
    pub conclusion: String,
    pub stress_conclusion: String,
    pub timing_code: Option<String>,
    /// Timing label for equities, drawdown action for index trackers.
    pub timing: String,
    pub timing_rationale: Option<String>,
    pub risk_score: f64,
    pub risk_tier: String,
    pub bear_price: f64,
    pub base_price: f64,
    pub bull_price: f64,
    /// Multiple the model applied; the feed value for index trackers.
    pub pe_ttm: Option<f64>,
    /// Five-year EPS growth.
    pub past_growth: Option<f64>,
    pub revenue_growth_quarterly: Option<f64>,
    pub roe_ttm: Option<f64>,
    pub net_profit_margin: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub drawdown: Option<f64>,
    pub link: String,
    pub evaluated_at: DateTime<Utc>,
}

fn fraction(value: Option<f64>) -> Option<f64> {
    finite(value).map(|v| round_to(percent_to_fraction(v), 6))
}

fn price(value: f64) -> f64 {
    round_to(value, 2)
}

impl ValuationRecord {
    pub fn from_evaluation(
        evaluation: &Evaluation,
        snapshot: &FundamentalSnapshot,
        locale: Locale,
        link: String,
    ) -> Self {
        let conclusion = evaluation.conclusion();
        let scenario = evaluation.scenario();

        let (timing, timing_rationale, drawdown) = match &evaluation.verdict {
            Verdict::Equity { timing, .. } => (
                timing.label.display(locale).to_string(),
                Some(timing.rationale.clone()),
                None,
            ),
            Verdict::IndexTracker { drawdown } => (
                drawdown.action.display(locale).to_string(),
                None,
                Some(round_to(drawdown.drawdown, 6)),
            ),
        };

        Self {
            symbol: evaluation.symbol.clone(),
            instrument: evaluation.instrument.name().to_string(),
            current_price: price(evaluation.current_price),
            peg_ratio: round_to(scenario.peg_ratio, 2),
            conclusion_code: conclusion.code().to_string(),
            conclusion: conclusion.display(locale).to_string(),
            stress_conclusion: evaluation.stressed_conclusion().display(locale).to_string(),
            timing_code: evaluation.timing_label().map(|t| t.code().to_string()),
            timing,
            timing_rationale,
            risk_score: round_to(evaluation.risk_score(), 1),
            risk_tier: evaluation.risk_tier().display(locale).to_string(),
            bear_price: price(scenario.bear_price),
            base_price: price(scenario.base_price),
            bull_price: price(scenario.bull_price),
            pe_ttm: evaluation
                .pe_multiple()
                .or_else(|| finite(snapshot.pe_ttm))
                .map(|pe| round_to(pe, 2)),
            past_growth: fraction(snapshot.eps_growth_5y),
            revenue_growth_quarterly: fraction(snapshot.revenue_growth_quarterly_yoy),
            roe_ttm: fraction(snapshot.roe_ttm),
            net_profit_margin: fraction(snapshot.net_profit_margin_ttm),
            dividend_yield: fraction(snapshot.dividend_yield()),
            drawdown,
            link,
            evaluated_at: Utc::now(),
        }
    }

    /// Labels as the alert latch sees them. Unknown codes read as absent.
    pub fn label_state(&self) -> LabelState {
        label_state_from_codes(Some(&self.conclusion_code), self.timing_code.as_deref())
    }
}

pub fn label_state_from_codes(conclusion: Option<&str>, timing: Option<&str>) -> LabelState {
    LabelState {
        conclusion: conclusion.and_then(|c| c.parse::<Conclusion>().ok()),
        timing: timing.and_then(|t| t.parse::<TimingKind>().ok()),
    }
}
