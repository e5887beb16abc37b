use std::time::Duration;

use anyhow::{Context, Result};
use notification_service::{Alert, AlertType, NotificationService};
use serde::Serialize;
use valuation_engine::{AlertReason, Evaluation, ValuationEngine};

use crate::config::ScannerConfig;
use crate::record::ValuationRecord;
use crate::snapshots::{is_supported_symbol, SnapshotEntry};
use crate::store::RecordStore;

/// Tally of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub evaluated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub alerts: usize,
}

/// What happened to a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Evaluated { alert: Option<AlertReason> },
    Skipped(String),
}

pub struct Scanner {
    config: ScannerConfig,
    engine: ValuationEngine,
    store: RecordStore,
    notifier: NotificationService,
}

impl Scanner {
    pub fn new(config: ScannerConfig, store: RecordStore, notifier: NotificationService) -> Result<Self> {
        let engine = ValuationEngine::new(config.engine.clone())
            .context("Invalid engine configuration")?;
        Ok(Self {
            config,
            engine,
            store,
            notifier,
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Process every entry in order. A failing symbol is logged and counted; it never
    /// stops the batch.
    pub async fn run(&self, entries: &[SnapshotEntry]) -> ScanSummary {
        let mut summary = ScanSummary {
            total: entries.len(),
            ..ScanSummary::default()
        };
        let mut deliveries = Vec::new();
        let delay = Duration::from_millis(self.config.symbol_delay_ms);

        for (idx, entry) in entries.iter().enumerate() {
            match self.process(entry).await {
                Ok((SymbolOutcome::Evaluated { alert }, pending)) => {
                    summary.evaluated += 1;
                    if alert.is_some() {
                        summary.alerts += 1;
                    }
                    deliveries.extend(pending);
                }
                Ok((SymbolOutcome::Skipped(reason), _)) => {
                    tracing::info!("Skipping {}: {}", entry.symbol, reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to process {}: {:#}", entry.symbol, e);
                    summary.errors += 1;
                }
            }

            if idx + 1 < entries.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        // Let in-flight notifications finish before the caller shuts the runtime down.
        for handle in deliveries {
            if let Err(e) = handle.await {
                tracing::warn!("Notification task failed: {}", e);
            }
        }

        tracing::info!(
            "Scan complete: {} evaluated, {} skipped, {} errors, {} alerts (of {})",
            summary.evaluated,
            summary.skipped,
            summary.errors,
            summary.alerts,
            summary.total
        );
        summary
    }

    async fn process(
        &self,
        entry: &SnapshotEntry,
    ) -> Result<(SymbolOutcome, Option<tokio::task::JoinHandle<usize>>)> {
        let symbol = entry.symbol.trim();
        if !is_supported_symbol(symbol) {
            return Ok((SymbolOutcome::Skipped("non-US listing".to_string()), None));
        }
        if let Err(e) = entry.snapshot.validate() {
            return Ok((SymbolOutcome::Skipped(e.to_string()), None));
        }

        let instrument = self.config.instrument_for(symbol);
        let evaluation = self.engine.evaluate(symbol, &entry.snapshot, instrument);
        let record = ValuationRecord::from_evaluation(
            &evaluation,
            &entry.snapshot,
            self.config.locale,
            self.config.deep_link(symbol),
        );

        let previous = self
            .store
            .previous_state(symbol)
            .await
            .with_context(|| format!("Failed to load previous labels for {symbol}"))?;
        let decision = evaluation.alert_decision(&previous);
        let alert = decision.reason.filter(|_| decision.should_fire);

        if self.config.dry_run {
            tracing::info!(
                "[dry-run] {} {} | {} | risk {:.1}{}",
                symbol,
                record.conclusion,
                record.timing,
                record.risk_score,
                if alert.is_some() { " | would alert" } else { "" }
            );
            return Ok((SymbolOutcome::Evaluated { alert }, None));
        }

        self.store
            .upsert(&record)
            .await
            .with_context(|| format!("Failed to write row for {symbol}"))?;

        let pending = alert.map(|reason| {
            tracing::info!("{}: {} alert", symbol, reason.display(self.config.locale));
            self.notifier
                .send_alert(build_alert(&evaluation, &reason, &record))
        });

        Ok((SymbolOutcome::Evaluated { alert }, pending))
    }
}

pub fn build_alert(evaluation: &Evaluation, reason: &AlertReason, record: &ValuationRecord) -> Alert {
    let symbol = evaluation.symbol.clone();
    let price = evaluation.current_price;
    let conclusion = record.conclusion.clone();
    let timing = record.timing.clone();
    let link = record.link.clone();

    let alert_type = match reason {
        AlertReason::Valuation(_) => AlertType::ValuationOpportunity {
            symbol,
            price,
            conclusion,
            timing,
            link,
        },
        AlertReason::Timing(_) => AlertType::TimingOpportunity {
            symbol,
            price,
            conclusion,
            timing,
            link,
        },
    };
    Alert::opportunity(alert_type)
}
