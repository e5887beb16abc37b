use std::str::FromStr;

use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

/// Language used for the human-readable label text stored with each row and sent in alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl FromStr for Locale {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Locale::En),
            "zh" | "zh-cn" | "chinese" => Ok(Locale::Zh),
            other => Err(AnalysisError::Config(format!("unknown locale: {other}"))),
        }
    }
}

/// Labels that have a stable storage code and localised display text.
pub trait Localized {
    /// Stable snake_case identifier, safe to persist and compare.
    fn code(&self) -> &'static str;

    fn display(&self, locale: Locale) -> &'static str;
}
