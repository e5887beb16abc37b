#[cfg(test)]
mod engine_tests {
    use analysis_core::{FundamentalSnapshot, InstrumentClass};
    use approx::assert_relative_eq;

    use crate::alert::{AlertReason, Conclusion, LabelState};
    use crate::engine::{ValuationEngine, Verdict};
    use crate::growth::MAX_GROWTH_RATE;
    use crate::labels::{DrawdownAction, DrawdownZone, LabelKind, RiskTier, TimingKind};
    use crate::locale::{Locale, Localized};
    use crate::strategy::{EngineConfig, StrategyProfile};

    fn reference_snapshot(price: f64) -> FundamentalSnapshot {
        let mut s = FundamentalSnapshot::with_price(price);
        s.eps_ttm = Some(5.0);
        s.pe_ttm = Some(20.0);
        s.eps_growth_ttm_yoy = Some(8.0);
        s.eps_growth_5y = Some(8.0);
        s.roe_ttm = Some(10.0);
        s.week52_low = Some(70.0);
        s.week52_high = Some(140.0);
        s
    }

    #[test]
    fn test_reference_example_through_engine() {
        let engine = ValuationEngine::default();
        let eval = engine.evaluate("ACME", &reference_snapshot(90.0), InstrumentClass::Equity);

        let scenario = eval.scenario();
        assert_relative_eq!(scenario.bear_price, 81.92, epsilon = 1e-9);
        assert_relative_eq!(scenario.base_price, 108.0, epsilon = 1e-9);
        assert_relative_eq!(scenario.bull_price, 132.48, epsilon = 1e-9);
        assert_relative_eq!(scenario.peg_ratio, 2.5, epsilon = 1e-9);
        assert_eq!(eval.conclusion(), Conclusion::Valuation(LabelKind::Accumulate));
    }

    #[test]
    fn test_growth_never_exceeds_cap_without_acceleration() {
        let engine = ValuationEngine::default();
        for raw in [12.0, 49.0, 51.0, 120.0, 499.0, f64::INFINITY] {
            let mut s = reference_snapshot(100.0);
            s.eps_growth_ttm_yoy = Some(raw);
            s.eps_growth_5y = Some(raw);
            s.revenue_growth_ttm_yoy = Some(raw);

            let eval = engine.evaluate("GROW", &s, InstrumentClass::Equity);
            let applied = eval.scenario().applied_growth;
            assert!(applied <= MAX_GROWTH_RATE, "{raw} produced {applied}");
            assert!(eval.scenario().base_price.is_finite());
        }
    }

    #[test]
    fn test_acceleration_uplift_may_exceed_cap() {
        let engine = ValuationEngine::default();
        let mut s = reference_snapshot(100.0);
        s.eps_growth_quarterly_yoy = Some(120.0);

        let eval = engine.evaluate("FAST", &s, InstrumentClass::Equity);
        let scenario = eval.scenario();
        // The estimate stays at 8; the quarterly jump lifts it to 0.8 * 120.
        assert_relative_eq!(scenario.applied_growth, 96.0, epsilon = 1e-9);
        assert!(scenario.applied_growth > MAX_GROWTH_RATE);
        assert_relative_eq!(scenario.base_price, 196.0, epsilon = 1e-9);
        assert_relative_eq!(scenario.bull_price, 337.2, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_eps_gives_degenerate_labels() {
        let engine = ValuationEngine::default();

        let mut turnaround = FundamentalSnapshot::with_price(12.0);
        turnaround.eps_ttm = Some(-0.8);
        turnaround.revenue_growth_quarterly_yoy = Some(60.0);
        let eval = engine.evaluate("TURN", &turnaround, InstrumentClass::Equity);
        assert_eq!(eval.conclusion(), Conclusion::Valuation(LabelKind::DistressReversal));
        assert_eq!(eval.risk_score(), 40.0);
        assert_eq!(eval.scenario().bear_price, 0.0);
        assert_eq!(eval.scenario().bull_price, 0.0);

        let mut burner = FundamentalSnapshot::with_price(4.0);
        burner.revenue_growth_ttm_yoy = Some(25.0);
        let eval = engine.evaluate("BURN", &burner, InstrumentClass::Equity);
        assert_eq!(eval.conclusion(), Conclusion::Valuation(LabelKind::LossMaking));
        assert_eq!(eval.risk_score(), 99.0);
        assert_eq!(eval.risk_tier(), RiskTier::HighVolatility);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let engine = ValuationEngine::new(EngineConfig::with_profile(StrategyProfile::Aggressive))
            .unwrap();
        let snapshot = reference_snapshot(77.0);

        let first = engine.evaluate("ACME", &snapshot, InstrumentClass::Equity);
        let second = engine.evaluate("ACME", &snapshot, InstrumentClass::Equity);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_value_trap_boundary_through_engine() {
        let engine = ValuationEngine::default();
        let mut s = reference_snapshot(20.0);
        s.pe_ttm = Some(9.0);
        s.eps_growth_ttm_yoy = Some(1.0);
        s.eps_growth_5y = Some(1.0);
        let eval = engine.evaluate("TRAP", &s, InstrumentClass::Equity);
        assert_eq!(eval.conclusion(), Conclusion::Valuation(LabelKind::ValueTrap));

        // Growth of exactly 2 is not a trap.
        s.eps_growth_ttm_yoy = Some(2.0);
        s.eps_growth_5y = Some(2.0);
        let eval = engine.evaluate("TRAP", &s, InstrumentClass::Equity);
        assert_ne!(eval.conclusion(), Conclusion::Valuation(LabelKind::ValueTrap));
    }

    #[test]
    fn test_risk_tier_boundaries_are_inclusive() {
        assert_eq!(RiskTier::from_score(20.0), RiskTier::VerySafeMargin);
        assert_eq!(RiskTier::from_score(20.01), RiskTier::AmpleMargin);
        assert_eq!(RiskTier::from_score(40.0), RiskTier::AmpleMargin);
        assert_eq!(RiskTier::from_score(60.0), RiskTier::Moderate);
        assert_eq!(RiskTier::from_score(80.0), RiskTier::Fragile);
        assert_eq!(RiskTier::from_score(80.5), RiskTier::HighVolatility);
    }

    #[test]
    fn test_alert_fires_on_transitions_across_runs() {
        let engine = ValuationEngine::default();
        // Fair hold, strike zone, strike zone, fair hold, strike zone.
        let prices = [105.0, 60.0, 62.0, 110.0, 61.0];

        let mut previous = LabelState::default();
        let mut fired = Vec::new();
        for (idx, price) in prices.iter().enumerate() {
            let mut s = reference_snapshot(*price);
            // Keep timing out of the rebound band so only valuation moves.
            s.week52_low = Some(40.0);
            s.week52_high = Some(200.0);

            let eval = engine.evaluate("ACME", &s, InstrumentClass::Equity);
            let decision = eval.alert_decision(&previous);
            if decision.should_fire {
                assert_eq!(
                    decision.reason,
                    Some(AlertReason::Valuation(Conclusion::Valuation(LabelKind::StrikeZone)))
                );
                fired.push(idx);
            }
            previous = eval.label_state();
        }

        assert_eq!(fired, vec![1, 4]);
    }

    #[test]
    fn test_index_drawdown_through_engine() {
        let engine = ValuationEngine::default();
        let mut s = FundamentalSnapshot::with_price(90.0);
        s.week52_high = Some(100.0);
        // Earnings fields are ignored for index trackers.
        s.eps_ttm = Some(-3.0);

        let eval = engine.evaluate("SPY", &s, InstrumentClass::IndexTracker);
        match &eval.verdict {
            Verdict::IndexTracker { drawdown } => {
                assert_relative_eq!(drawdown.drawdown, -0.10, epsilon = 1e-12);
                assert_eq!(drawdown.zone, DrawdownZone::AccumulationZone);
                assert_eq!(drawdown.action, DrawdownAction::Add);
            }
            other => panic!("expected drawdown verdict, got {other:?}"),
        }
        assert_eq!(eval.risk_tier(), RiskTier::AmpleMargin);
    }

    #[test]
    fn test_stress_run_is_never_more_generous() {
        let engine = ValuationEngine::default();
        for price in [50.0, 90.0, 120.0] {
            let eval = engine.evaluate("ACME", &reference_snapshot(price), InstrumentClass::Equity);
            match &eval.verdict {
                Verdict::Equity { normal, stressed, .. } => {
                    assert!(stressed.scenario.bear_price <= normal.scenario.bear_price);
                    assert!(stressed.scenario.base_price <= normal.scenario.base_price);
                    assert!(stressed.scenario.bull_price <= normal.scenario.bull_price);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_nan_fields_do_not_leak() {
        let engine = ValuationEngine::default();
        let mut s = FundamentalSnapshot::with_price(50.0);
        s.eps_ttm = Some(2.5);
        s.pe_ttm = Some(f64::NAN);
        s.eps_growth_ttm_yoy = Some(f64::NAN);
        s.eps_growth_5y = Some(f64::INFINITY);
        s.eps_growth_quarterly_yoy = Some(f64::NAN);
        s.roe_ttm = Some(f64::NAN);
        s.week52_low = Some(f64::NAN);
        s.risk_free_rate = f64::NAN;

        let eval = engine.evaluate("NAN", &s, InstrumentClass::Equity);
        let scenario = eval.scenario();
        assert!(scenario.bear_price.is_finite());
        assert!(scenario.base_price.is_finite());
        assert!(scenario.bull_price.is_finite());
        assert!(eval.risk_score().is_finite());
        assert_eq!(eval.timing_label(), Some(TimingKind::RangeBound));
    }

    #[test]
    fn test_labels_localise_without_changing_codes() {
        let label = Conclusion::Valuation(LabelKind::StrikeZone);
        assert_eq!(label.code(), "strike_zone");
        assert_ne!(label.display(Locale::En), label.display(Locale::Zh));
        assert_eq!(label.code().parse::<Conclusion>().unwrap(), label);
    }
}
