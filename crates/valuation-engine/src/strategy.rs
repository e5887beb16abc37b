use std::str::FromStr;

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

/// Named scenario-model presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyProfile {
    Conservative,
    /// GARP defaults.
    #[default]
    Moderate,
    Aggressive,
}

impl StrategyProfile {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyProfile::Conservative => "conservative",
            StrategyProfile::Moderate => "moderate",
            StrategyProfile::Aggressive => "aggressive",
        }
    }

    pub fn config(&self) -> StrategyConfig {
        match self {
            StrategyProfile::Conservative => StrategyConfig {
                bull_multiplier: 1.1,
                bear_discount: 0.7,
                rate_drag: true,
            },
            StrategyProfile::Moderate => StrategyConfig::default(),
            StrategyProfile::Aggressive => StrategyConfig {
                bull_multiplier: 1.4,
                bear_discount: 0.85,
                rate_drag: false,
            },
        }
    }
}

impl FromStr for StrategyProfile {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(StrategyProfile::Conservative),
            "moderate" | "garp" => Ok(StrategyProfile::Moderate),
            "aggressive" => Ok(StrategyProfile::Aggressive),
            other => Err(AnalysisError::Config(format!("unknown strategy: {other}"))),
        }
    }
}

/// Multipliers applied by the scenario valuator. Passed in per call, never global.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Multiple applied to the bull case before acceleration widening.
    pub bull_multiplier: f64,
    /// Multiple applied to the bear case before the quality bonus.
    pub bear_discount: f64,
    /// Compress multiples when `pe * risk_free_rate > 100`.
    pub rate_drag: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            bull_multiplier: 1.2,
            bear_discount: 0.8,
            rate_drag: true,
        }
    }
}

impl StrategyConfig {
    pub fn new(bull_multiplier: f64, bear_discount: f64, rate_drag: bool) -> Result<Self, AnalysisError> {
        let config = Self {
            bull_multiplier,
            bear_discount,
            rate_drag,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.bull_multiplier.is_finite() || self.bull_multiplier < 1.0 {
            return Err(AnalysisError::Config(
                "bull_multiplier must be a finite value >= 1".to_string(),
            ));
        }
        if !self.bear_discount.is_finite() || self.bear_discount <= 0.0 || self.bear_discount > 1.0 {
            return Err(AnalysisError::Config(
                "bear_discount must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the engine needs besides the snapshot itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub strategy: StrategyConfig,
    /// Growth multiplier for the stress re-run.
    pub stress_growth_factor: f64,
    /// PE multiplier for the stress re-run.
    pub stress_multiple_factor: f64,
    /// Used when the feed has no trailing PE.
    pub default_pe: f64,
    /// Overrides the snapshot's risk-free rate when set.
    pub risk_free_rate_override: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            stress_growth_factor: 0.7,
            stress_multiple_factor: 0.8,
            default_pe: 20.0,
            risk_free_rate_override: None,
        }
    }
}

impl EngineConfig {
    pub fn with_profile(profile: StrategyProfile) -> Self {
        Self {
            strategy: profile.config(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.strategy.validate()?;
        for (name, factor) in [
            ("stress_growth_factor", self.stress_growth_factor),
            ("stress_multiple_factor", self.stress_multiple_factor),
        ] {
            if !factor.is_finite() || factor <= 0.0 || factor > 1.0 {
                return Err(AnalysisError::Config(format!("{name} must be in (0, 1]")));
            }
        }
        if !self.default_pe.is_finite() || self.default_pe <= 0.0 {
            return Err(AnalysisError::Config("default_pe must be positive".to_string()));
        }
        if let Some(rate) = self.risk_free_rate_override {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AnalysisError::Config(
                    "risk-free rate override must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }
}
