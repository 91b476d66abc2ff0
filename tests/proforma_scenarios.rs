//! End-to-end proforma runs through the public API

use approx::assert_relative_eq;

use underwriting_engine::{
    generate_proforma,
    proforma::{calculate_irr, export, EngineConfig, ProformaEngine},
    t12::load_t12,
    DealFile, ProformaAssumptions, ScenarioRunner, T12Totals, WhatIf,
};

fn stabilized_deal() -> ProformaAssumptions {
    serde_json::from_str(
        r#"{
            "currentNOI": 500000,
            "currentOccupancy": 0.85,
            "purchasePrice": 6250000,
            "downPaymentPct": 0.30,
            "interestRate": 0.08,
            "loanTermYears": 25,
            "annualRentGrowth": 0.0,
            "annualExpenseInflation": 0.0,
            "targetOccupancy": 0.85,
            "occupancyRampYears": 0,
            "holdYears": 5,
            "refiYear": null,
            "exitYear": 5,
            "exitCapRate": 0.08
        }"#,
    )
    .expect("valid assumptions JSON")
}

#[test]
fn flat_deal_sells_at_purchase_price() {
    let a = stabilized_deal();
    let result = generate_proforma(&a);

    assert_eq!(result.years.len(), 5);
    assert_relative_eq!(result.years[4].noi, result.years[0].noi, epsilon = 1e-6);
    assert_relative_eq!(result.years[4].exit_sale_price.unwrap(), 6_250_000.0, epsilon = 1e-6);
    assert!(result.refi_year().is_none());
    assert_eq!(result.years.iter().filter(|y| y.is_exit_year).count(), 1);
}

#[test]
fn refinance_pulls_equity_out() {
    let mut a = stabilized_deal();
    a.annual_rent_growth = 0.03;
    a.annual_expense_inflation = 0.025;
    a.target_occupancy = 0.93;
    a.occupancy_ramp_years = 2;
    a.refi_year = Some(2);
    a.exit_cap_rate = 0.088;

    let result = generate_proforma(&a);
    let refi = result.refi_year().expect("refinance modeled");
    assert!(refi.refi_distribution.unwrap() > 0.0);
    assert_eq!(result.years.iter().filter(|y| y.is_refi_year).count(), 1);
}

#[test]
fn zero_equity_does_not_divide() {
    let mut a = stabilized_deal();
    a.purchase_price = 0.0;
    let result = generate_proforma(&a);

    assert_eq!(result.metrics.total_equity_invested, 0.0);
    assert_eq!(result.metrics.equity_multiple, 0.0);
    assert_eq!(result.metrics.average_cash_on_cash, 0.0);
}

#[test]
fn fully_financed_deal_has_no_equity_ratios() {
    let mut a = stabilized_deal();
    a.down_payment_pct = 0.0;
    let result = generate_proforma(&a);

    // The whole price is borrowed, so debt service is still charged
    assert!(result.years[0].debt_service > 0.0);
    assert_eq!(result.metrics.total_equity_invested, 0.0);
    assert_eq!(result.metrics.equity_multiple, 0.0);
    assert_eq!(result.metrics.average_cash_on_cash, 0.0);
    assert!(result.metrics.irr.is_finite());
}

#[test]
fn irr_of_single_period_gain() {
    assert_relative_eq!(calculate_irr(&[-100.0, 121.0]).rate(), 0.21, epsilon = 1e-4);
}

#[test]
fn sample_deal_with_t12_end_to_end() {
    let deal = DealFile::load("data/sample_deal.json").expect("sample deal");
    let months = load_t12("data/sample_t12.csv").expect("sample T12");
    let totals = T12Totals::from_months(&months);

    let assumptions = deal.assumptions(&totals);
    assert_eq!(assumptions.current_noi, totals.total_noi);
    assert_eq!(assumptions.current_gross_revenue, Some(totals.total_gross_revenue));

    let current = ProformaEngine::default().run(&assumptions);
    let legacy = ProformaEngine::new(EngineConfig::legacy()).run(&assumptions);
    assert_eq!(current.years.len(), legacy.years.len());
    // Trailing revenue is the baseline, grown one year and scaled by the occupancy ramp
    let y1 = &current.years[0];
    assert_relative_eq!(
        y1.gross_revenue,
        totals.total_gross_revenue * 1.03 * y1.occupancy / totals.avg_occupancy_rate,
        max_relative = 1e-9
    );

    let mut csv = Vec::new();
    export::write_proforma_csv(&mut csv, deal.deal_id, &current.years).expect("csv export");
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), current.years.len() + 1);
}

#[test]
fn what_if_runs_match_direct_runs() {
    let base = stabilized_deal();
    let runner = ScenarioRunner::new(base.clone());

    let what_if = WhatIf { exit_cap_rate: Some(0.07), hold_years: Some(7), ..Default::default() };
    let mut direct = base;
    direct.exit_cap_rate = 0.07;
    direct.hold_years = 7;
    direct.exit_year = 7;

    assert_eq!(runner.run(&what_if), generate_proforma(&direct));
}
