//! End-to-end integration tests for the valuation flow.
//!
//! Tests the complete valuation pipeline:
//! Statement history → Normalized metrics → Cost of capital → DCF valuation
//!
//! All fixtures are deterministic; running the same request twice must
//! produce identical results.

use std::fs;

use tempfile::tempdir;

use intrinsic_engine::cost_of_capital::{CostOfCapitalCalculator, CostOfCapitalSnapshot};
use intrinsic_engine::dcf::{Archetype, DcfEngine, ScenarioPreset, ValuationRequest};
use intrinsic_engine::metrics::{
    FcfObservation, FinancialMetricsSnapshot, StatementHistory, StatementYear,
};

// ============================================================================
// Test Data Generators
// ============================================================================

/// Metrics for a mature industrial with a pre-normalized base FCFF and no
/// cash flow history, so the base candidate passes the normalizer unchanged.
fn mature_metrics() -> FinancialMetricsSnapshot {
    FinancialMetricsSnapshot {
        revenue_last: Some(1.0e9),
        revenue_cagr_5y: Some(0.08),
        net_debt: Some(200.0e6),
        shares_outstanding: Some(1.0e9),
        base_year: Some(2024),
        base_year_fcff_normalized: Some(140.0e6),
        ..Default::default()
    }
}

fn valuation_request(scenario: Option<&str>) -> ValuationRequest {
    ValuationRequest {
        metrics: mature_metrics(),
        cost_of_capital: CostOfCapitalSnapshot {
            wacc: Some(0.09),
            ..Default::default()
        },
        horizon_years: Some(5),
        g_terminal: Some(0.02),
        scenario: scenario.map(str::to_string),
    }
}

/// Five years of statements growing 6% annually with flat 20% EBIT margins.
///
/// Every line item scales with the same factor, so derived ratios (tax rate,
/// margins, CAGR) come out exact and easy to assert against.
fn build_statement_history() -> StatementHistory {
    let mut years = Vec::new();
    for i in 0..5 {
        let f = 1.0 / 1.06f64.powi(i);
        years.push(StatementYear {
            year: Some(2024 - i),
            revenue: Some(40.0e9 * f),
            ebit: Some(8.0e9 * f),
            pretax_income: Some(7.8e9 * f),
            tax_expense: Some(1.638e9 * f),
            interest_expense: Some(-0.35e9 * f),
            depreciation_amortization: Some(1.5e9 * f),
            operating_cash_flow: Some(9.0e9 * f),
            capital_expenditures: Some(-2.0e9 * f),
            free_cash_flow: Some(7.0e9 * f),
            net_ppe: Some(12.0e9 * f),
            current_assets: Some(10.0e9 * f),
            current_liabilities: Some(7.0e9 * f),
            cash: Some(5.0e9 * f),
            short_long_term_debt: Some(1.0e9),
            long_term_debt: Some(7.0e9),
            ..Default::default()
        });
    }
    StatementHistory::new(years)
}

// ============================================================================
// Mature Flow Tests
// ============================================================================

#[test]
fn test_mature_valuation_end_to_end() {
    let engine = DcfEngine::new();
    let result = engine.run(&valuation_request(None)).unwrap();

    // Candidate-only base passes through the normalizer unchanged
    assert!((result.base_fcff - 140.0e6).abs() < 1e-3);

    // Five explicit years labelled off the base year
    assert_eq!(result.fcff_forecast.len(), 5);
    let years: Vec<i32> = result.fcff_forecast.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2025, 2026, 2027, 2028, 2029]);

    // The requested 2% terminal growth is lifted to the scenario floor
    assert!((result.settings.g_terminal - 0.025).abs() < 1e-9);
    assert!((result.terminal_value.g_terminal.unwrap() - 0.025).abs() < 1e-9);

    // A WACC already inside the base band passes through untouched
    assert!((result.settings.wacc - 0.09).abs() < 1e-9);
    let first = &result.fcff_forecast[0];
    assert!((first.discount_factor.unwrap() - 1.0 / 1.09).abs() < 1e-9);

    // Value bridge: EV is explicit PV plus terminal PV, equity nets out debt
    let pv_explicit: f64 = result.fcff_forecast.iter().filter_map(|r| r.pv_fcff).sum();
    let ev = pv_explicit + result.terminal_value.pv_tv.unwrap();
    assert!((result.enterprise_value - ev).abs() < 1.0);
    assert!((result.equity_value - (result.enterprise_value - 200.0e6)).abs() < 1.0);

    let price = result.implied_share_price.unwrap();
    assert!((price - result.equity_value / 1.0e9).abs() < 1e-9);
    assert!(price > 0.0);

    // Mature rows never carry the revenue columns
    assert!(result
        .fcff_forecast
        .iter()
        .all(|r| r.revenue.is_none() && r.fcff_margin.is_none()));
}

#[test]
fn test_settings_echo_resolved_twins() {
    let result = DcfEngine::new().run(&valuation_request(None)).unwrap();
    let settings = &result.settings;

    assert_eq!(settings.horizon_years, settings.horizon_years_used);
    assert_eq!(settings.horizon_years, 5);
    assert!((settings.g_terminal - settings.g_terminal_used).abs() < 1e-12);
    assert!((settings.wacc - settings.wacc_used).abs() < 1e-12);
    assert_eq!(settings.engine_version, "v2");
    assert_eq!(settings.scenario_preset, ScenarioPreset::Base);
    assert_eq!(settings.archetype, Archetype::Mature);
    assert!((settings.revenue_cagr_5y_used.unwrap() - 0.08).abs() < 1e-12);
}

#[test]
fn test_forward_tilt_discounts_projection_seed() {
    let result = DcfEngine::new().run(&valuation_request(None)).unwrap();

    // The only growth signal is the 8% revenue CAGR
    let g_short = result.settings.growth_short.unwrap();
    assert!((g_short - 0.08).abs() < 1e-9);

    // Base preset pulls 25% of one growth step into the seed, deflated by
    // the full step
    let expected = 140.0e6 * (1.0 + 0.25 * g_short) / (1.0 + g_short);
    assert!((result.settings.base_fcff_projection_start - expected).abs() < 1e-3);
    assert!(result.settings.base_fcff_projection_start < result.base_fcff);
}

// ============================================================================
// Scenario Spread Tests
// ============================================================================

#[test]
fn test_presets_order_enterprise_value() {
    let engine = DcfEngine::new();
    let conservative = engine
        .run(&valuation_request(Some("conservative")))
        .unwrap();
    let base = engine.run(&valuation_request(None)).unwrap();
    let optimistic = engine.run(&valuation_request(Some("optimistic"))).unwrap();

    assert!(conservative.enterprise_value < base.enterprise_value);
    assert!(base.enterprise_value < optimistic.enterprise_value);

    // Conservative and optimistic bundles pin their own horizons; base
    // honors the requested five years
    assert_eq!(conservative.settings.horizon_years, 8);
    assert_eq!(base.settings.horizon_years, 5);
    assert_eq!(optimistic.settings.horizon_years, 12);

    // Conservative shifts the 9% WACC up a full point
    assert!((conservative.settings.wacc - 0.10).abs() < 1e-9);
}

#[test]
fn test_optimistic_terminal_echo_vs_projection_cap() {
    let result = DcfEngine::new()
        .run(&valuation_request(Some("optimistic")))
        .unwrap();

    // The bundle floor lifts the requested 2% to 2.8% in the settings echo,
    // while the mature projection caps its own terminal drift at 2.5%
    assert!((result.settings.g_terminal - 0.028).abs() < 1e-9);
    assert!((result.terminal_value.g_terminal.unwrap() - 0.025).abs() < 1e-9);
}

// ============================================================================
// Hypergrowth Flow Tests
// ============================================================================

#[test]
fn test_growth_model_hint_routes_revenue_path() {
    let mut metrics = mature_metrics();
    metrics.growth_model = Some("High Growth".to_string());
    metrics.revenue_cagr_5y = Some(0.35);

    let request = ValuationRequest {
        metrics,
        ..valuation_request(None)
    };
    let result = DcfEngine::new().run(&request).unwrap();

    assert_eq!(result.settings.archetype, Archetype::Hypergrowth);
    // The hypergrowth base bundle pins 12 years over the requested five
    assert_eq!(result.settings.horizon_years, 12);

    // Revenue columns are populated on this path
    assert!(result
        .fcff_forecast
        .iter()
        .all(|r| r.revenue.is_some() && r.fcff_margin.is_some()));

    // 35% CAGR sits inside the phase-one band and is used as-is
    assert!((result.settings.growth_phase1_rev.unwrap() - 0.35).abs() < 1e-9);
    let first = &result.fcff_forecast[0];
    assert!((first.revenue.unwrap() - 1.0e9 * 1.35).abs() < 1e-3);
    assert!(
        (result.settings.fcff_margin_start.unwrap() - first.fcff_margin.unwrap()).abs() < 1e-9
    );
}

// ============================================================================
// Derive Flow Tests
// ============================================================================

#[test]
fn test_statement_normalization() {
    let history = build_statement_history();
    let metrics = history.to_metrics();

    assert!((metrics.normalized_tax_rate.unwrap() - 0.21).abs() < 1e-9);
    assert_eq!(metrics.growth_model.as_deref(), Some("Established Growth"));
    assert!((metrics.net_debt.unwrap() - 3.0e9).abs() < 1.0);
    assert_eq!(metrics.base_year, Some(2024));
    assert_eq!(metrics.fcf_series.len(), 5);
    assert!((metrics.revenue_cagr_5y.unwrap() - 0.06).abs() < 1e-9);

    // Margins are flat at 20% by construction
    assert_eq!(metrics.margin_history.len(), 5);
    for margin in &metrics.margin_history {
        assert!((margin - 0.20).abs() < 1e-9);
    }

    // Built-up base FCFF: NOPAT + D&A - capex - working-capital change
    let delta_wc = 3.0e9 * (1.0 - 1.0 / 1.06);
    let expected = 8.0e9 * 0.79 + 1.5e9 - 2.0e9 - delta_wc;
    assert!((metrics.base_year_fcff_normalized.unwrap() - expected).abs() < 1.0);
}

#[test]
fn test_capital_inputs_drive_cost_of_capital() {
    let history = build_statement_history();
    let inputs = history.capital_inputs(Some(1.2), Some(100.0e9));
    assert!((inputs.total_debt.unwrap() - 8.0e9).abs() < 1.0);
    assert!((inputs.ebit.unwrap() - 8.0e9).abs() < 1.0);

    let calculator = CostOfCapitalCalculator::new();
    let snapshot = calculator.build_snapshot(&inputs);

    // Observed debt yield: 0.35 of interest on 8.0 of debt
    assert!((snapshot.cost_of_debt.unwrap() - 0.04375).abs() < 1e-9);
    // 100/108 equity weight sits inside the [0.70, 0.98] echo band
    assert!((snapshot.equity_weight.unwrap() - 100.0 / 108.0).abs() < 1e-9);
    let wacc = snapshot.wacc.unwrap();
    assert!((0.06..=0.11).contains(&wacc));
}

#[test]
fn test_derive_then_valuate_chain() {
    // Step 1: Normalize the statement history; shares come from the quote
    let history = build_statement_history();
    let mut metrics = history.to_metrics();
    metrics.shares_outstanding = Some(1.5e9);

    // Step 2: Build the cost-of-capital snapshot from the same statements
    let calculator = CostOfCapitalCalculator::new();
    let cost_of_capital =
        calculator.build_snapshot(&history.capital_inputs(Some(1.1), Some(100.0e9)));

    // Step 3: Run the valuation on engine defaults
    let request = ValuationRequest {
        metrics,
        cost_of_capital,
        horizon_years: None,
        g_terminal: None,
        scenario: None,
    };
    let result = DcfEngine::new().run(&request).unwrap();

    // Step 4: Check the resolved assumptions
    assert_eq!(result.settings.horizon_years, 10);
    assert_eq!(result.settings.archetype, Archetype::Mature);
    assert!((0.07..=0.10).contains(&result.settings.wacc));
    // Auto-derived terminal growth (2% + half the 6% CAGR) caps at the
    // base-band ceiling
    assert!((result.settings.g_terminal - 0.033).abs() < 1e-9);
    assert!((result.terminal_value.g_terminal.unwrap() - 0.025).abs() < 1e-9);

    // Step 5: Check the value bridge
    assert_eq!(result.fcff_forecast.len(), 10);
    assert_eq!(result.fcff_forecast[0].year, 2025);
    assert!(result.enterprise_value > 0.0);
    assert!((result.equity_value - (result.enterprise_value - 3.0e9)).abs() < 1.0);
    let price = result.implied_share_price.unwrap();
    assert!((price - result.equity_value / 1.5e9).abs() < 1e-6);
    assert!(price > 0.0);
}

// ============================================================================
// Failure Path Tests
// ============================================================================

#[test]
fn test_no_cash_flow_is_fatal() {
    let request = ValuationRequest {
        metrics: FinancialMetricsSnapshot {
            revenue_last: Some(5.0e8),
            shares_outstanding: Some(1.0e8),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = DcfEngine::new().run(&request).unwrap_err();
    assert!(err.is_no_base_data());

    let payload = err.to_payload();
    assert_eq!(payload.error, "no_base_fcf");
    assert_eq!(
        payload.message,
        "No usable free cash flow available for this valuation."
    );
}

#[test]
fn test_negative_history_cannot_seed_base() {
    let request = ValuationRequest {
        metrics: FinancialMetricsSnapshot {
            fcf_series: vec![
                FcfObservation {
                    year: Some(2024),
                    value: Some(-120.0e6),
                    ..Default::default()
                },
                FcfObservation {
                    year: Some(2023),
                    value: Some(-80.0e6),
                    ..Default::default()
                },
            ],
            base_fcf: Some(-50.0e6),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = DcfEngine::new().run(&request).unwrap_err();
    assert!(err.is_no_base_data());
}

// ============================================================================
// Wire Contract Tests
// ============================================================================

#[test]
fn test_request_parses_from_wire_payload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("request.json");
    fs::write(
        &path,
        r#"{
            "metrics": {
                "revenueLast": 2.0e9,
                "revenueCAGR5Y": 0.07,
                "netDebt": 4.0e8,
                "sharesOutstanding": 5.0e8,
                "baseYear": 2024,
                "fcfSeries": [
                    {"label": "2024-09-30", "value": 260.0e6},
                    {"label": "2023-09-30", "value": 240.0e6},
                    {"label": "2022-09-30", "value": 230.0e6}
                ]
            },
            "costOfCapital": {"wacc": 0.085},
            "horizonYears": 6,
            "scenario": "conservative"
        }"#,
    )
    .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let request: ValuationRequest = serde_json::from_str(&raw).unwrap();
    assert_eq!(request.horizon_years, Some(6));
    assert_eq!(request.metrics.fcf_series[0].resolved_year(), Some(2024));

    let result = DcfEngine::new().run(&request).unwrap();
    assert_eq!(result.settings.scenario_preset, ScenarioPreset::Conservative);
    // The conservative bundle pins eight years over the requested six
    assert_eq!(result.settings.horizon_years, 8);
    assert!((result.settings.wacc - 0.095).abs() < 1e-9);
}

#[test]
fn test_result_serializes_published_keys() {
    let result = DcfEngine::new().run(&valuation_request(None)).unwrap();
    let value = serde_json::to_value(&result).unwrap();

    let settings = &value["settings"];
    assert_eq!(settings["engineVersion"], "v2");
    assert!(settings.get("horizonYearsUsed").is_some());
    assert!(settings.get("gTerminalUsed").is_some());
    assert!(settings.get("waccUsed").is_some());
    assert!(settings.get("revenueCAGR5YUsed").is_some());
    assert_eq!(settings["scenarioPreset"], "base");
    assert_eq!(settings["archetype"], "mature");

    let row = &value["fcffForecast"][0];
    assert!(row.get("discountFactor").is_some());
    assert!(row.get("pvFcff").is_some());
    assert!(row["revenue"].is_null());

    let terminal = &value["terminalValue"];
    assert!(terminal.get("fcffTerminal").is_some());
    assert!(terminal.get("pvTv").is_some());
    assert!(terminal["terminalReinvestmentRate"].is_null());

    assert!(value.get("enterpriseValue").is_some());
    assert!(value.get("equityValue").is_some());
    assert!(value.get("impliedSharePrice").is_some());
    assert!(value.get("baseFcff").is_some());
}
