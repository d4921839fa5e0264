//! Integration tests for the history store.
//!
//! 1. A committed period reloads with identical bills
//! 2. Re-committing a period replaces it
//! 3. Records list newest first
//! 4. Closing readings carry into the next period
//! 5. Working settings persist between sessions
//! 6. A stored period can be reopened or deleted

use condo_billing_core::{
    calculate_all_units,
    enrich_tariff_tiers,
    error::BillingError,
    expenses::CommonExpenses,
    config::BillingConfig,
    history::{units_from_record, BillingHistory},
    period::PeriodId,
    store::{BillingStore, SETTING_COMMON_EXPENSES, SETTING_TARIFF_RATES, SETTING_UNITS},
    tariff::{TariffRates, TariffTier},
    unit::{create_initial_units, Unit},
    working::{ResetOptions, WorkingState},
};

fn store() -> BillingStore {
    let store = BillingStore::in_memory().expect("in-memory store");
    store.migrate().expect("migrate");
    store
}

fn period(s: &str) -> PeriodId {
    s.parse().unwrap()
}

fn units() -> Vec<Unit> {
    vec![
        Unit::new("11", 90.0).with_readings(100.0, 112.5),
        Unit::new("12", 110.0).with_readings(250.0, 253.0),
        Unit::new("21", 100.0).with_readings(75.0, 96.25),
    ]
}

fn expenses() -> CommonExpenses {
    CommonExpenses {
        garbage_fee: 45.0,
        other_services_fee: 120.0,
        total_utility_water_sewer_bill: 812.33,
        ..CommonExpenses::default()
    }
}

fn tariffs() -> TariffRates {
    enrich_tariff_tiers(&TariffRates::standard())
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: lossless round trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn committed_period_reloads_identically() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());

    let saved = history
        .commit(period("2024-05"), &bills, &expenses(), &tariffs())
        .unwrap();
    let loaded = history.load(&period("2024-05")).unwrap();

    assert_eq!(loaded, saved);
    assert_eq!(loaded.units, bills);
    assert_eq!(loaded.common_expenses, expenses());
    assert_eq!(loaded.tariff_rates, tariffs());
}

#[test]
fn record_totals_aggregate_bills() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());

    let record = history
        .commit(period("2024-05"), &bills, &expenses(), &tariffs())
        .unwrap();
    let totals = record.totals;

    assert_eq!(totals.total_reading, 112.5 + 253.0 + 96.25);
    assert_eq!(totals.total_consumption, 12.5 + 3.0 + 21.25);
    let total_bill: f64 = bills.iter().map(|b| b.total_bill).sum();
    assert_eq!(totals.total_bill, total_bill);
    assert_eq!(totals.average_bill, total_bill / 3.0);
}

#[test]
fn commit_freezes_an_enriched_tariff() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());

    let record = history
        .commit(period("2024-05"), &bills, &expenses(), &TariffRates::standard())
        .unwrap();
    assert!(record.tariff_rates.is_enriched());
}

#[test]
fn commit_falls_back_to_the_given_tariff() {
    let store = store();
    let configured = TariffRates {
        tiers: vec![
            TariffTier::fixed("fixed_tier", "Minimum (0-30m³)", 30.0, 310.0),
            TariffTier::excess("excess_tier_1", "Excess tier 1 (above 30m³)", 10.0, 2.0),
        ],
        sewer_rate_percentage: 80.0,
    };
    let history = BillingHistory::new(&store, configured.clone());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());

    let no_tiers = TariffRates { tiers: vec![], sewer_rate_percentage: 80.0 };
    let record = history
        .commit(period("2024-05"), &bills, &expenses(), &no_tiers)
        .unwrap();
    assert_eq!(record.tariff_rates, enrich_tariff_tiers(&configured));
}

#[test]
fn empty_calculation_cannot_be_committed() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let err = history
        .commit(period("2024-05"), &[], &expenses(), &tariffs())
        .unwrap_err();
    assert!(matches!(err, BillingError::NothingToSave));
    assert_eq!(store.monthly_record_count().unwrap(), 0);
}

#[test]
fn loading_unknown_period_fails() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    assert!(matches!(
        history.load(&period("1999-01")),
        Err(BillingError::RecordNotFound { .. })
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: upsert
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn recommitting_a_period_replaces_it() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());

    let first = calculate_all_units(&units(), &expenses(), &tariffs());
    history
        .commit(period("2024-05"), &first, &expenses(), &tariffs())
        .unwrap();

    let mut revised_expenses = expenses();
    revised_expenses.total_utility_water_sewer_bill = 900.0;
    let second = calculate_all_units(&units(), &revised_expenses, &tariffs());
    history
        .commit(period("2024-05"), &second, &revised_expenses, &tariffs())
        .unwrap();

    assert_eq!(store.monthly_record_count().unwrap(), 1);
    let loaded = history.load(&period("2024-05")).unwrap();
    assert_eq!(loaded.units, second);
    assert_eq!(loaded.common_expenses.total_utility_water_sewer_bill, 900.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: ordering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn records_list_newest_first() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());

    for p in ["2023-12", "2024-02", "2024-01"] {
        history.commit(period(p), &bills, &expenses(), &tariffs()).unwrap();
    }

    let periods: Vec<String> = history
        .list()
        .unwrap()
        .iter()
        .map(|r| r.period.to_string())
        .collect();
    assert_eq!(periods, vec!["2024-02", "2024-01", "2023-12"]);

    let rows = store.monthly_record_rows().unwrap();
    assert_eq!(rows[0].period, "2024-02");
    assert_eq!(rows.len(), 3);

    assert!(store.delete_monthly_record(&period("2024-01")).unwrap());
    assert!(!store.delete_monthly_record(&period("2024-01")).unwrap());
    assert_eq!(store.monthly_record_count().unwrap(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: carrying readings forward
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn closing_readings_become_next_period_opening() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let december = units();
    let bills = calculate_all_units(&december, &expenses(), &tariffs());
    history
        .commit(period("2023-12"), &bills, &expenses(), &tariffs())
        .unwrap();

    let january = period("2024-01");
    assert!(history.can_import_previous(&january).unwrap());
    assert!(!history.can_import_previous(&period("2024-03")).unwrap());

    let mut roster = december.clone();
    roster.push(Unit::new("99", 50.0).with_readings(5.0, 9.0));

    let imported = history.import_previous_readings(&january, &roster).unwrap();
    for (before, after) in december.iter().zip(&imported) {
        assert_eq!(after.previous_reading, before.current_reading);
        assert_eq!(after.current_reading, 0.0);
        assert_eq!(after.id, before.id);
    }
    // Not in December's record: untouched.
    assert_eq!(imported[3].previous_reading, 5.0);
    assert_eq!(imported[3].current_reading, 9.0);

    assert!(matches!(
        history.import_previous_readings(&period("2024-03"), &roster),
        Err(BillingError::RecordNotFound { .. })
    ));
}

#[test]
fn stored_record_rebuilds_editable_units() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());
    let record = history
        .commit(period("2024-05"), &bills, &expenses(), &tariffs())
        .unwrap();

    let labels: Vec<String> = vec!["11".into(), "12".into(), "21".into()];
    let roster = create_initial_units(&labels, 100.0);
    let rebuilt = units_from_record(&record, &roster);

    assert_eq!(rebuilt.len(), 3);
    assert_eq!(rebuilt[0].id, roster[0].id);
    assert_eq!(rebuilt[0].area, 100.0);
    assert_eq!(rebuilt[0].previous_reading, 100.0);
    assert_eq!(rebuilt[0].current_reading, 112.5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: settings
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn settings_round_trip() {
    let store = store();
    assert_eq!(store.load_setting::<Vec<Unit>>(SETTING_UNITS).unwrap(), None);

    let saved = units();
    store.save_setting(SETTING_UNITS, &saved).unwrap();
    store.save_setting(SETTING_UNITS, &saved[..1]).unwrap();
    let loaded: Vec<Unit> = store.load_setting(SETTING_UNITS).unwrap().unwrap();
    assert_eq!(loaded, saved[..1].to_vec());

    store.save_setting(SETTING_TARIFF_RATES, &tariffs()).unwrap();
    let raw = store.load_setting_raw(SETTING_TARIFF_RATES).unwrap().unwrap();
    assert!(raw.contains("sewer_rate_percentage"));
}

#[test]
fn saved_expenses_are_used_by_the_next_run() {
    let store = store();
    let config = BillingConfig::default_test();

    let first = WorkingState::load(&store, &config, ResetOptions::default()).unwrap();
    assert_eq!(first.expenses, config.expenses);

    let entered = expenses();
    WorkingState { expenses: entered.clone(), ..first }.save(&store).unwrap();

    let next = WorkingState::load(&store, &config, ResetOptions::default()).unwrap();
    assert_eq!(next.expenses, entered);

    let reset = ResetOptions { expenses: true, ..ResetOptions::default() };
    let fresh = WorkingState::load(&store, &config, reset).unwrap();
    assert_eq!(fresh.expenses, config.expenses);
}

#[test]
fn unreadable_stored_expenses_fall_back_to_config() {
    let store = store();
    let config = BillingConfig::default_test();
    store.save_setting(SETTING_COMMON_EXPENSES, "not an expenses object").unwrap();

    let state = WorkingState::load(&store, &config, ResetOptions::default()).unwrap();
    assert_eq!(state.expenses, config.expenses);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: reopening and deleting periods
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn restored_period_becomes_the_working_state() {
    let store = store();
    let config = BillingConfig::default_test();
    let history = BillingHistory::new(&store, config.tariffs.clone());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());
    history
        .commit(period("2024-05"), &bills, &expenses(), &tariffs())
        .unwrap();

    let labels: Vec<String> = vec!["11".into(), "12".into(), "21".into()];
    let roster = create_initial_units(&labels, 100.0);
    let (record, state) = history.restore(&period("2024-05"), &roster).unwrap();

    assert_eq!(record.units, bills);
    assert_eq!(state.expenses, expenses());
    assert_eq!(state.tariffs, tariffs());
    assert_eq!(state.units[1].current_reading, 253.0);

    let saved: Vec<Unit> = store.load_setting(SETTING_UNITS).unwrap().unwrap();
    assert_eq!(saved, state.units);
    let saved: CommonExpenses = store.load_setting(SETTING_COMMON_EXPENSES).unwrap().unwrap();
    assert_eq!(saved, expenses());

    assert!(matches!(
        history.restore(&period("2024-04"), &roster),
        Err(BillingError::RecordNotFound { .. })
    ));
}

#[test]
fn deleting_a_period_removes_it_once() {
    let store = store();
    let history = BillingHistory::new(&store, TariffRates::standard());
    let bills = calculate_all_units(&units(), &expenses(), &tariffs());
    history
        .commit(period("2024-05"), &bills, &expenses(), &tariffs())
        .unwrap();

    assert!(history.delete(&period("2024-05")).unwrap());
    assert!(!history.delete(&period("2024-05")).unwrap());
    assert!(history.list().unwrap().is_empty());
}
