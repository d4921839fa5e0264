//! billing-runner: headless billing run for one condominium period.
//!
//! Usage:
//!   billing-runner --period 2024-05 --readings readings.json
//!   billing-runner --period 2024-06 --import-previous --readings june.json --commit
//!   billing-runner --period 2024-06 --expenses june-expenses.json --commit
//!   billing-runner --history --db billing.db
//!   billing-runner --load 2024-05
//!   billing-runner --delete 2024-05
//!
//! The tariff and common expenses in use are the ones saved by the previous
//! run; pass --reset-tariffs or --reset-expenses to start again from
//! <data-dir>/tariffs.json or <data-dir>/expenses.json.

use anyhow::Result;
use condo_billing_core::{
    config::BillingConfig,
    engine::{BillingEngine, BillingRun},
    history::BillingHistory,
    period::PeriodId,
    report::BillingReport,
    expenses::CommonExpenses,
    store::BillingStore,
    unit::{apply_readings, ReadingEntry},
    validate::validate_units,
    working::{ResetOptions, WorkingState},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let db = arg_value(&args, "--db").unwrap_or("billing.db");
    let period = match arg_value(&args, "--period") {
        Some(p) => p.parse::<PeriodId>()?,
        None => PeriodId::current(),
    };
    let readings = arg_value(&args, "--readings");
    let expenses_file = arg_value(&args, "--expenses");
    let import_previous = has_flag(&args, "--import-previous");
    let commit = has_flag(&args, "--commit");
    let show_history = has_flag(&args, "--history");
    let reset = ResetOptions {
        tariffs:  has_flag(&args, "--reset-tariffs"),
        expenses: has_flag(&args, "--reset-expenses"),
    };

    let config = BillingConfig::load(data_dir)?;
    let store = BillingStore::open(db)?;
    store.migrate()?;
    let history = BillingHistory::new(&store, config.tariffs.clone());

    if show_history {
        print_history(&store)?;
        return Ok(());
    }

    let mut state = WorkingState::load(&store, &config, reset)?;

    if let Some(p) = arg_value(&args, "--delete") {
        let p = p.parse::<PeriodId>()?;
        if history.delete(&p)? {
            println!("Deleted {p} from history.");
        } else {
            println!("No record for {p} in history.");
        }
        return Ok(());
    }

    if let Some(p) = arg_value(&args, "--load") {
        let p = p.parse::<PeriodId>()?;
        let (record, _) = history.restore(&p, &state.units)?;
        println!("Loaded {p} from history as the working state.");
        println!();
        let report = BillingReport::build(
            record.period,
            &record.units,
            &record.common_expenses,
            &record.tariff_rates,
        );
        print!("{}", report.render_text());
        return Ok(());
    }

    println!("Condominium water billing: billing-runner");
    println!("  period:    {period}");
    println!("  data_dir:  {data_dir}");
    println!("  db:        {db}");
    println!();

    if import_previous {
        if history.can_import_previous(&period)? {
            state.units = history.import_previous_readings(&period, &state.units)?;
        } else {
            log::warn!("no history for {} to import readings from", period.previous());
        }
    }

    if let Some(path) = readings {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let entries: Vec<ReadingEntry> = serde_json::from_str(&content)?;
        state.units = apply_readings(&state.units, &entries)?;
    }

    if let Some(path) = expenses_file {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        state.expenses = serde_json::from_str::<CommonExpenses>(&content)?;
    }

    validate_units(&state.units)?;

    let engine = BillingEngine::new(config);
    let run = engine.calculate(&state.units, &state.expenses, &state.tariffs);
    state.tariffs = run.tariffs.clone();
    state.save(&store)?;

    let report = BillingReport::build(period, &run.bills, &state.expenses, &run.tariffs);
    print!("{}", report.render_text());
    print_reconciliation(&run);

    if commit {
        let record = history.commit(period, &run.bills, &state.expenses, &run.tariffs)?;
        println!();
        println!(
            "Saved {} to history: total {:.2}, average {:.2} per unit",
            record.period, record.totals.total_bill, record.totals.average_bill
        );
    }

    Ok(())
}

fn print_reconciliation(run: &BillingRun) {
    println!();
    if run.degraded() {
        println!("Tariff has no usable fixed tier: all bills are zero. Check tariffs.json.");
        return;
    }
    if let Some(r) = run.reconciliation {
        println!(
            "Invoice {:.2} vs tariff-derived water {:.2}: difference {:.2} ({})",
            r.invoice_total,
            r.computed_water_total,
            r.difference,
            if r.applied() {
                format!("spread by {:?}", r.basis)
            } else {
                "within tolerance, not applied".to_string()
            }
        );
    }
}

fn print_history(store: &BillingStore) -> Result<()> {
    let rows = store.monthly_record_rows()?;
    println!("=== HISTORY ===");
    if rows.is_empty() {
        println!("  (No periods saved yet)");
        return Ok(());
    }
    for row in rows {
        println!(
            "  {} | Reading: {:.0} m³ | Consumption: {:.2} m³ | Total: {:.2} | Avg/unit: {:.2}",
            row.period, row.total_reading, row.total_consumption, row.total_bill, row.average_bill
        );
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
