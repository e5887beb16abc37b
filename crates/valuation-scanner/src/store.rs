use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use valuation_engine::LabelState;

use crate::record::{label_state_from_codes, ValuationRecord};

/// The per-symbol row table. The only history kept is the previous labels.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Single writer; also keeps an in-memory database on one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS valuation_rows (
                symbol TEXT PRIMARY KEY,
                instrument TEXT NOT NULL,
                current_price REAL NOT NULL,
                peg_ratio REAL NOT NULL,
                conclusion_code TEXT NOT NULL,
                conclusion TEXT NOT NULL,
                stress_conclusion TEXT NOT NULL,
                timing_code TEXT,
                timing TEXT NOT NULL,
                timing_rationale TEXT,
                risk_score REAL NOT NULL,
                risk_tier TEXT NOT NULL,
                bear_price REAL NOT NULL,
                base_price REAL NOT NULL,
                bull_price REAL NOT NULL,
                pe_ttm REAL,
                past_growth REAL,
                revenue_growth_quarterly REAL,
                roe_ttm REAL,
                net_profit_margin REAL,
                dividend_yield REAL,
                drawdown REAL,
                link TEXT NOT NULL,
                evaluated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Labels written by the last run, or the empty state for a new symbol.
    pub async fn previous_state(&self, symbol: &str) -> Result<LabelState> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            "SELECT conclusion_code, timing_code FROM valuation_rows WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((conclusion, timing)) => {
                let state = label_state_from_codes(Some(&conclusion), timing.as_deref());
                if state.conclusion.is_none() {
                    tracing::warn!("{}: unreadable stored conclusion '{}'", symbol, conclusion);
                }
                state
            }
            None => LabelState::default(),
        })
    }

    pub async fn upsert(&self, record: &ValuationRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO valuation_rows
             (symbol, instrument, current_price, peg_ratio, conclusion_code, conclusion,
              stress_conclusion, timing_code, timing, timing_rationale, risk_score, risk_tier,
              bear_price, base_price, bull_price, pe_ttm, past_growth, revenue_growth_quarterly,
              roe_ttm, net_profit_margin, dividend_yield, drawdown, link, evaluated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(symbol) DO UPDATE SET
              instrument = excluded.instrument,
              current_price = excluded.current_price,
              peg_ratio = excluded.peg_ratio,
              conclusion_code = excluded.conclusion_code,
              conclusion = excluded.conclusion,
              stress_conclusion = excluded.stress_conclusion,
              timing_code = excluded.timing_code,
              timing = excluded.timing,
              timing_rationale = excluded.timing_rationale,
              risk_score = excluded.risk_score,
              risk_tier = excluded.risk_tier,
              bear_price = excluded.bear_price,
              base_price = excluded.base_price,
              bull_price = excluded.bull_price,
              pe_ttm = excluded.pe_ttm,
              past_growth = excluded.past_growth,
              revenue_growth_quarterly = excluded.revenue_growth_quarterly,
              roe_ttm = excluded.roe_ttm,
              net_profit_margin = excluded.net_profit_margin,
              dividend_yield = excluded.dividend_yield,
              drawdown = excluded.drawdown,
              link = excluded.link,
              evaluated_at = excluded.evaluated_at",
        )
        .bind(&record.symbol)
        .bind(&record.instrument)
        .bind(record.current_price)
        .bind(record.peg_ratio)
        .bind(&record.conclusion_code)
        .bind(&record.conclusion)
        .bind(&record.stress_conclusion)
        .bind(record.timing_code.as_deref())
        .bind(&record.timing)
        .bind(record.timing_rationale.as_deref())
        .bind(record.risk_score)
        .bind(&record.risk_tier)
        .bind(record.bear_price)
        .bind(record.base_price)
        .bind(record.bull_price)
        .bind(record.pe_ttm)
        .bind(record.past_growth)
        .bind(record.revenue_growth_quarterly)
        .bind(record.roe_ttm)
        .bind(record.net_profit_margin)
        .bind(record.dividend_yield)
        .bind(record.drawdown)
        .bind(&record.link)
        .bind(record.evaluated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, symbol: &str) -> Result<Option<ValuationRecord>> {
        let record = sqlx::query_as::<_, ValuationRecord>(
            "SELECT * FROM valuation_rows WHERE symbol = ?",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM valuation_rows")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{FundamentalSnapshot, InstrumentClass};
    use valuation_engine::{Conclusion, LabelKind, Locale, TimingKind, ValuationEngine};

    fn record(symbol: &str, price: f64) -> ValuationRecord {
        let mut s = FundamentalSnapshot::with_price(price);
        s.eps_ttm = Some(5.0);
        s.pe_ttm = Some(20.0);
        s.eps_growth_ttm_yoy = Some(8.0);
        s.eps_growth_5y = Some(8.0);
        s.revenue_growth_quarterly_yoy = Some(12.0);
        s.roe_ttm = Some(10.0);
        s.week52_low = Some(55.0);
        s.week52_high = Some(150.0);
        let eval = ValuationEngine::default().evaluate(symbol, &s, InstrumentClass::Equity);
        ValuationRecord::from_evaluation(&eval, &s, Locale::En, format!("https://x/{symbol}"))
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = RecordStore::new("sqlite::memory:").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_has_empty_state() {
        let store = RecordStore::new("sqlite::memory:").await.unwrap();
        assert_eq!(store.previous_state("ACME").await.unwrap(), LabelState::default());
        assert!(store.get("ACME").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_single_row() {
        let store = RecordStore::new("sqlite::memory:").await.unwrap();

        store.upsert(&record("ACME", 60.0)).await.unwrap();
        let state = store.previous_state("ACME").await.unwrap();
        assert_eq!(state.conclusion, Some(Conclusion::Valuation(LabelKind::StrikeZone)));

        store.upsert(&record("ACME", 105.0)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        let state = store.previous_state("ACME").await.unwrap();
        assert_eq!(state.conclusion, Some(Conclusion::Valuation(LabelKind::FairHold)));

        let row = store.get("ACME").await.unwrap().unwrap();
        assert_eq!(row.current_price, 105.0);
        assert_eq!(row.link, "https://x/ACME");
    }

    #[tokio::test]
    async fn test_stored_row_matches_written_row() {
        let store = RecordStore::new("sqlite::memory:").await.unwrap();
        let written = record("ACME", 60.0);
        store.upsert(&written).await.unwrap();

        let read = store.get("ACME").await.unwrap().unwrap();
        assert_eq!(read.conclusion_code, written.conclusion_code);
        assert_eq!(read.timing_code, written.timing_code);
        assert_eq!(read.past_growth, written.past_growth);
        assert_eq!(read.revenue_growth_quarterly, written.revenue_growth_quarterly);
        assert_eq!(read.drawdown, None);
        assert_eq!(read.label_state(), written.label_state());
        assert!(matches!(
            read.label_state().timing,
            Some(TimingKind::RightSideBreakout)
        ));
    }
}
