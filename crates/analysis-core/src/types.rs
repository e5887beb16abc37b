use serde::{Deserialize, Deserializer, Serialize};

use crate::numeric::finite;
use crate::AnalysisError;

pub const DEFAULT_RISK_FREE_RATE: f64 = 4.5;

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

// A missing or null quote becomes 0 so `validate` rejects the symbol instead of the
// whole file failing to parse.
fn price_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Per-symbol fundamentals and quote, as delivered by the metrics feed.
///
/// Every ratio is optional. `None` means the feed did not send the field at all,
/// which is not the same as a reported zero: the growth estimator treats a missing
/// TTM EPS growth figure differently from a present `0.0`.
/// Growth, ROE and margin fields are in percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    #[serde(rename = "currentPrice", default, deserialize_with = "price_or_zero")]
    pub current_price: f64,
    #[serde(rename = "epsTTM", default)]
    pub eps_ttm: Option<f64>,
    #[serde(rename = "peTTM", default)]
    pub pe_ttm: Option<f64>,
    #[serde(rename = "epsGrowthTTMYoy", default)]
    pub eps_growth_ttm_yoy: Option<f64>,
    #[serde(rename = "epsGrowth5Y", default)]
    pub eps_growth_5y: Option<f64>,
    #[serde(rename = "epsGrowthQuarterlyYoy", default)]
    pub eps_growth_quarterly_yoy: Option<f64>,
    #[serde(rename = "revenueGrowthTTMYoy", default)]
    pub revenue_growth_ttm_yoy: Option<f64>,
    #[serde(rename = "revenueGrowth5Y", default)]
    pub revenue_growth_5y: Option<f64>,
    #[serde(rename = "revenueGrowthQuarterlyYoy", default)]
    pub revenue_growth_quarterly_yoy: Option<f64>,
    #[serde(rename = "roeTTM", default)]
    pub roe_ttm: Option<f64>,
    #[serde(rename = "52WeekLow", default)]
    pub week52_low: Option<f64>,
    #[serde(rename = "52WeekHigh", default)]
    pub week52_high: Option<f64>,
    #[serde(rename = "netProfitMarginTTM", default)]
    pub net_profit_margin_ttm: Option<f64>,
    #[serde(rename = "dividendYieldIndicatedAnnual", default)]
    pub dividend_yield_indicated_annual: Option<f64>,
    #[serde(rename = "currentDividendYieldTTM", default)]
    pub current_dividend_yield_ttm: Option<f64>,
    #[serde(rename = "riskFreeRate", default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

impl FundamentalSnapshot {
    /// Snapshot with only a price; every fundamental is missing.
    pub fn with_price(current_price: f64) -> Self {
        Self {
            current_price,
            eps_ttm: None,
            pe_ttm: None,
            eps_growth_ttm_yoy: None,
            eps_growth_5y: None,
            eps_growth_quarterly_yoy: None,
            revenue_growth_ttm_yoy: None,
            revenue_growth_5y: None,
            revenue_growth_quarterly_yoy: None,
            roe_ttm: None,
            week52_low: None,
            week52_high: None,
            net_profit_margin_ttm: None,
            dividend_yield_indicated_annual: None,
            current_dividend_yield_ttm: None,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }

    /// A snapshot is only worth evaluating when the quote resolved to a real price.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.current_price.is_finite() || self.current_price <= 0.0 {
            return Err(AnalysisError::InsufficientData(format!(
                "no usable price (got {})",
                self.current_price
            )));
        }
        Ok(())
    }

    /// Indicated annual dividend yield, falling back to the trailing figure.
    pub fn dividend_yield(&self) -> Option<f64> {
        finite(self.dividend_yield_indicated_annual).or_else(|| finite(self.current_dividend_yield_ttm))
    }

    /// Risk-free rate with invalid or negative input replaced by the 4.5% default.
    pub fn risk_free_rate(&self) -> f64 {
        finite(Some(self.risk_free_rate))
            .filter(|rate| *rate >= 0.0)
            .unwrap_or(DEFAULT_RISK_FREE_RATE)
    }
}

/// How a symbol is priced: on earnings, or on distance from its 52-week high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    Equity,
    IndexTracker,
}

impl InstrumentClass {
    /// Resolve against the configured set of broad-market index trackers.
    /// A trailing `.US` exchange suffix is ignored on both sides.
    pub fn resolve<S: AsRef<str>>(symbol: &str, index_trackers: &[S]) -> Self {
        let symbol = strip_us_suffix(symbol);
        if index_trackers
            .iter()
            .any(|s| strip_us_suffix(s.as_ref()).eq_ignore_ascii_case(symbol))
        {
            InstrumentClass::IndexTracker
        } else {
            InstrumentClass::Equity
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstrumentClass::Equity => "equity",
            InstrumentClass::IndexTracker => "index_tracker",
        }
    }
}

fn strip_us_suffix(symbol: &str) -> &str {
    let symbol = symbol.trim();
    match symbol.len().checked_sub(3) {
        Some(cut) if symbol.is_char_boundary(cut) && symbol[cut..].eq_ignore_ascii_case(".US") => {
            &symbol[..cut]
        }
        _ => symbol,
    }
}
