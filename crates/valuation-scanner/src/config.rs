use std::env;
use std::path::PathBuf;

use analysis_core::InstrumentClass;
use anyhow::{Context, Result};
use valuation_engine::{EngineConfig, Locale, StrategyProfile};

pub const DEFAULT_INDEX_SYMBOLS: &str = "SPY,QQQ,VOO,IVV,DIA,VTI";
pub const DEFAULT_DEEP_LINK_TEMPLATE: &str = "https://www.google.com/search?q={symbol}+stock";

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// JSON array of `{ symbol, snapshot }` written by the fetch job.
    pub snapshot_path: PathBuf,
    pub database_url: String,
    pub strategy: StrategyProfile,
    pub locale: Locale,
    /// Symbols priced on drawdown instead of earnings.
    pub index_symbols: Vec<String>,
    pub symbol_delay_ms: u64,
    /// `{symbol}` is replaced with the ticker.
    pub deep_link_template: String,
    pub engine: EngineConfig,
    /// Evaluate and log only: no row writes, no alerts.
    pub dry_run: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("snapshots.json"),
            database_url: "sqlite:valuations.db".to_string(),
            strategy: StrategyProfile::default(),
            locale: Locale::default(),
            index_symbols: parse_symbol_list(DEFAULT_INDEX_SYMBOLS),
            symbol_delay_ms: 800,
            deep_link_template: DEFAULT_DEEP_LINK_TEMPLATE.to_string(),
            engine: EngineConfig::default(),
            dry_run: false,
        }
    }
}

impl ScannerConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let strategy = env::var("STRATEGY")
            .unwrap_or_else(|_| defaults.strategy.name().to_string())
            .parse::<StrategyProfile>()
            .context("Invalid STRATEGY")?;

        let mut engine = EngineConfig::with_profile(strategy);
        engine.stress_growth_factor = env::var("STRESS_GROWTH_FACTOR")
            .unwrap_or_else(|_| engine.stress_growth_factor.to_string())
            .parse::<f64>()
            .context("Invalid STRESS_GROWTH_FACTOR")?;
        engine.stress_multiple_factor = env::var("STRESS_MULTIPLE_FACTOR")
            .unwrap_or_else(|_| engine.stress_multiple_factor.to_string())
            .parse::<f64>()
            .context("Invalid STRESS_MULTIPLE_FACTOR")?;
        engine.risk_free_rate_override = env::var("RISK_FREE_RATE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().parse::<f64>())
            .transpose()
            .context("Invalid RISK_FREE_RATE")?;

        let config = Self {
            snapshot_path: env::var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            strategy,
            locale: env::var("LOCALE")
                .unwrap_or_else(|_| "en".to_string())
                .parse::<Locale>()
                .context("Invalid LOCALE")?,
            index_symbols: env::var("INDEX_SYMBOLS")
                .map(|v| parse_symbol_list(&v))
                .unwrap_or(defaults.index_symbols),
            symbol_delay_ms: env::var("SYMBOL_DELAY_MS")
                .unwrap_or_else(|_| defaults.symbol_delay_ms.to_string())
                .parse::<u64>()
                .context("Invalid SYMBOL_DELAY_MS")?,
            deep_link_template: env::var("DEEP_LINK_TEMPLATE")
                .unwrap_or(defaults.deep_link_template),
            engine,
            dry_run: false,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("Invalid engine configuration")?;
        if !self.deep_link_template.contains("{symbol}") {
            anyhow::bail!("DEEP_LINK_TEMPLATE must contain {{symbol}}");
        }
        Ok(())
    }

    /// Command-line flags override the environment.
    pub fn apply_args(&mut self, args: &[String]) {
        if args.iter().any(|a| a == "--dry-run") {
            self.dry_run = true;
        }
        if let Some(path) = flag_value(args, "--snapshots") {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(url) = flag_value(args, "--db") {
            self.database_url = url.to_string();
        }
    }

    pub fn instrument_for(&self, symbol: &str) -> InstrumentClass {
        InstrumentClass::resolve(symbol, &self.index_symbols)
    }

    pub fn deep_link(&self, symbol: &str) -> String {
        self.deep_link_template.replace("{symbol}", symbol)
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|v| !v.starts_with("--"))
        .map(|s| s.as_str())
}

pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::default();
        assert_eq!(config.database_url, "sqlite:valuations.db");
        assert_eq!(config.symbol_delay_ms, 800);
        assert_eq!(config.index_symbols.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_flags_override() {
        let mut config = ScannerConfig::default();
        config.apply_args(&args(&[
            "valuation-scanner",
            "--snapshots",
            "/tmp/today.json",
            "--db",
            "sqlite::memory:",
            "--dry-run",
        ]));

        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/today.json"));
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.dry_run);
    }

    #[test]
    fn test_flag_without_value_is_ignored() {
        let mut config = ScannerConfig::default();
        config.apply_args(&args(&["valuation-scanner", "--db", "--dry-run"]));
        assert_eq!(config.database_url, "sqlite:valuations.db");
        assert!(config.dry_run);
    }

    #[test]
    fn test_symbol_list_parsing() {
        assert_eq!(parse_symbol_list(" spy, qqq ,,VTI "), vec!["SPY", "QQQ", "VTI"]);
        assert!(parse_symbol_list("").is_empty());
    }

    #[test]
    fn test_instrument_and_link() {
        let config = ScannerConfig::default();
        assert_eq!(config.instrument_for("qqq"), InstrumentClass::IndexTracker);
        assert_eq!(config.instrument_for("SPY.US"), InstrumentClass::IndexTracker);
        assert_eq!(config.instrument_for("AAPL"), InstrumentClass::Equity);
        assert_eq!(config.deep_link("AAPL"), "https://www.google.com/search?q=AAPL+stock");
    }

    #[test]
    fn test_template_must_name_symbol() {
        let config = ScannerConfig {
            deep_link_template: "https://example.com/quote".to_string(),
            ..ScannerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
