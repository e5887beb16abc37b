//! Change-triggered alerting.
//!
//! Each evaluation produces a [`LabelState`]. The caller persists it and hands it
//! back on the next run; an alert fires only when a signal goes from "not good" to
//! "good" between the two. There is no cooldown: leaving the good state re-arms it.

use std::str::FromStr;

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

use crate::labels::{DrawdownZone, LabelKind, TimingKind};
use crate::locale::{Locale, Localized};

/// Headline conclusion of an evaluation, whichever pricing path produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Conclusion {
    Valuation(LabelKind),
    Drawdown(DrawdownZone),
}

impl Conclusion {
    /// Valuation side of the alert latch.
    pub fn is_opportunity(&self) -> bool {
        matches!(
            self,
            Conclusion::Valuation(LabelKind::StrikeZone) | Conclusion::Drawdown(DrawdownZone::Panic)
        )
    }
}

impl Localized for Conclusion {
    fn code(&self) -> &'static str {
        match self {
            Conclusion::Valuation(label) => label.code(),
            Conclusion::Drawdown(zone) => zone.code(),
        }
    }

    fn display(&self, locale: Locale) -> &'static str {
        match self {
            Conclusion::Valuation(label) => label.display(locale),
            Conclusion::Drawdown(zone) => zone.display(locale),
        }
    }
}

impl FromStr for Conclusion {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<LabelKind>()
            .map(Conclusion::Valuation)
            .or_else(|_| s.parse::<DrawdownZone>().map(Conclusion::Drawdown))
            .map_err(|_| AnalysisError::InvalidData(format!("unknown conclusion code: {s}")))
    }
}

fn timing_is_opportunity(timing: TimingKind) -> bool {
    timing == TimingKind::RightSideBreakout
}

/// The labels an evaluation left behind. Missing fields read as "not good".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelState {
    pub conclusion: Option<Conclusion>,
    pub timing: Option<TimingKind>,
}

impl LabelState {
    fn valuation_is_good(&self) -> bool {
        self.conclusion.is_some_and(|c| c.is_opportunity())
    }

    fn timing_is_good(&self) -> bool {
        self.timing.is_some_and(timing_is_opportunity)
    }
}

/// Which signal crossed into its good state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "label", rename_all = "snake_case")]
pub enum AlertReason {
    Valuation(Conclusion),
    Timing(TimingKind),
}

impl AlertReason {
    pub fn display(&self, locale: Locale) -> &'static str {
        match self {
            AlertReason::Valuation(conclusion) => conclusion.display(locale),
            AlertReason::Timing(timing) => timing.display(locale),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDecision {
    pub should_fire: bool,
    pub reason: Option<AlertReason>,
}

impl AlertDecision {
    fn quiet() -> Self {
        Self {
            should_fire: false,
            reason: None,
        }
    }

    fn fire(reason: AlertReason) -> Self {
        Self {
            should_fire: true,
            reason: Some(reason),
        }
    }
}

pub struct AlertStateTracker;

impl AlertStateTracker {
    /// Rising-edge check on both signals. Valuation wins when both rise together.
    pub fn decide(previous: &LabelState, current: &LabelState) -> AlertDecision {
        let valuation_rose = current.valuation_is_good() && !previous.valuation_is_good();
        let timing_rose = current.timing_is_good() && !previous.timing_is_good();

        match (valuation_rose, timing_rose, current.conclusion, current.timing) {
            (true, _, Some(conclusion), _) => AlertDecision::fire(AlertReason::Valuation(conclusion)),
            (false, true, _, Some(timing)) => AlertDecision::fire(AlertReason::Timing(timing)),
            _ => AlertDecision::quiet(),
        }
    }
}
