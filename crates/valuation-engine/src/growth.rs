use analysis_core::numeric::{finite, or_zero};
use analysis_core::FundamentalSnapshot;
use serde::{Deserialize, Serialize};

/// Ceiling on any growth rate fed into the scenario model, in percent.
pub const MAX_GROWTH_RATE: f64 = 50.0;

/// Used when a profitable name has no usable earnings growth history at all.
const BASELINE_GROWTH: f64 = 8.0;

/// Used when the relevant long-run figure exists but cannot be trusted.
const FLOOR_GROWTH: f64 = 5.0;

/// TTM growth must beat the 5-year average by this much to replace it.
const ACCELERATION_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthEstimate {
    /// Expected annual growth in percent.
    pub rate: f64,
    pub is_loss_making: bool,
}

/// Derives one expected growth rate from noisy fundamentals.
///
/// Loss-makers, and names whose feed omits TTM EPS growth entirely, are judged on
/// revenue momentum. Profitable names are judged on earnings growth, with the TTM
/// figure taking over from the 5-year average only on a strong acceleration.
pub struct GrowthEstimator;

impl GrowthEstimator {
    pub fn estimate(snapshot: &FundamentalSnapshot) -> GrowthEstimate {
        let is_loss_making = finite(snapshot.eps_ttm).map_or(true, |eps| eps <= 0.0);

        // A reported 0.0 is data; only a missing field routes to revenue.
        let rate = if is_loss_making || snapshot.eps_growth_ttm_yoy.is_none() {
            Self::from_revenue(snapshot)
        } else {
            Self::from_earnings(snapshot)
        };

        GrowthEstimate { rate, is_loss_making }
    }

    fn from_revenue(snapshot: &FundamentalSnapshot) -> f64 {
        let recent = or_zero(snapshot.revenue_growth_ttm_yoy)
            .max(or_zero(snapshot.revenue_growth_quarterly_yoy));

        if recent > 0.0 {
            recent.min(MAX_GROWTH_RATE)
        } else {
            finite(snapshot.revenue_growth_5y).unwrap_or(FLOOR_GROWTH)
        }
    }

    fn from_earnings(snapshot: &FundamentalSnapshot) -> f64 {
        let ttm = finite(snapshot.eps_growth_ttm_yoy);
        let past = finite(snapshot.eps_growth_5y).or(ttm);

        if let (Some(ttm), Some(past)) = (ttm, past) {
            if ttm > 0.0 && ttm > past + ACCELERATION_MARGIN {
                return ttm.min(MAX_GROWTH_RATE);
            }
        }

        match past {
            Some(past) if past > -50.0 && past < 500.0 => past,
            Some(_) => FLOOR_GROWTH,
            None => BASELINE_GROWTH,
        }
    }
}
