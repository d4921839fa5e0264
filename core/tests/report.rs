//! Integration tests for the report view.

use condo_billing_core::{
    calculate_all_units,
    enrich_tariff_tiers,
    expenses::CommonExpenses,
    period::PeriodId,
    report::BillingReport,
    tariff::TariffRates,
    unit::Unit,
};

#[test]
fn totals_row_sums_unit_rows() {
    let units = vec![
        Unit::new("11", 100.0).with_readings(10.0, 30.0),
        Unit::new("12", 100.0).with_readings(20.0, 25.0),
    ];
    let expenses = CommonExpenses {
        garbage_fee: 30.0,
        ..CommonExpenses::standard()
    };
    let tariffs = enrich_tariff_tiers(&TariffRates::standard());
    let bills = calculate_all_units(&units, &expenses, &tariffs);

    let report = BillingReport::build("2024-05".parse::<PeriodId>().unwrap(), &bills, &expenses, &tariffs);

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.totals.label, "TOTAL");
    assert_eq!(report.totals.previous_reading, 30.0);
    assert_eq!(report.totals.current_reading, 55.0);
    assert_eq!(report.totals.consumption, 25.0);
    let total: f64 = bills.iter().map(|b| b.total_bill).sum();
    assert_eq!(report.totals.total_bill, total);
}

#[test]
fn text_rendering_lists_every_unit() {
    let units = vec![
        Unit::new("11", 100.0).with_readings(0.0, 8.0),
        Unit::new("42", 100.0).with_readings(0.0, 3.0),
    ];
    let tariffs = enrich_tariff_tiers(&TariffRates::standard());
    let bills = calculate_all_units(&units, &CommonExpenses::standard(), &tariffs);

    let text = BillingReport::build(
        "2024-11".parse().unwrap(),
        &bills,
        &CommonExpenses::standard(),
        &tariffs,
    )
    .render_text();

    assert!(text.contains("11/2024"));
    assert!(text.contains("\n11 "));
    assert!(text.contains("\n42 "));
    assert!(text.contains("TOTAL"));
    assert!(text.contains("Minimum (0-40m³)"));
    assert!(text.contains("$ 404.29"), "utility invoice is shown");
}
