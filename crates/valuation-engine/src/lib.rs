pub mod alert;
pub mod classifier;
pub mod drawdown;
pub mod engine;
pub mod growth;
pub mod labels;
pub mod locale;
pub mod risk;
pub mod scenario;
pub mod strategy;
pub mod timing;
#[cfg(test)]
mod tests;

pub use alert::{AlertDecision, AlertReason, AlertStateTracker, Conclusion, LabelState};
pub use classifier::{ClassificationResult, LabelClassifier};
pub use drawdown::{DrawdownAnalyzer, DrawdownResult};
pub use engine::{Evaluation, ValuationEngine, Verdict};
pub use growth::{GrowthEstimate, GrowthEstimator, MAX_GROWTH_RATE};
pub use labels::{DrawdownAction, DrawdownZone, LabelKind, RiskTier, TimingKind};
pub use locale::{Locale, Localized};
pub use risk::RiskScorer;
pub use scenario::{ScenarioInputs, ScenarioOutcome, ScenarioValuator, ValuationScenario};
pub use strategy::{EngineConfig, StrategyConfig, StrategyProfile};
pub use timing::{TimingAnalyzer, TimingResult};
