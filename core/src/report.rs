//! Read-only export view of a calculation: one row per unit, a totals
//! row, and the tariff and expense figures the bills were built from.

use crate::{
    bill::CalculatedUnitBill,
    expenses::CommonExpenses,
    period::PeriodId,
    tariff::TariffRates,
};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportRow {
    pub label:            String,
    pub previous_reading: f64,
    pub current_reading:  f64,
    pub consumption:      f64,
    pub fixed_share:      f64,
    pub excess_tier_cost: f64,
    pub water_cost:       f64,
    pub equal_share:      f64,
    pub proportional_fee: f64,
    pub total_bill:       f64,
}

impl ReportRow {
    fn from_bill(bill: &CalculatedUnitBill) -> Self {
        Self {
            label:            bill.unit.unit_label.clone(),
            previous_reading: bill.unit.previous_reading,
            current_reading:  bill.unit.current_reading,
            consumption:      bill.consumption,
            fixed_share:      bill.fixed_share,
            excess_tier_cost: bill.excess_tier_cost,
            water_cost:       bill.water_cost,
            equal_share:      bill.equal_share,
            proportional_fee: bill.proportional_fee,
            total_bill:       bill.total_bill,
        }
    }

    fn accumulate(&mut self, other: &ReportRow) {
        self.previous_reading += other.previous_reading;
        self.current_reading  += other.current_reading;
        self.consumption      += other.consumption;
        self.fixed_share      += other.fixed_share;
        self.excess_tier_cost += other.excess_tier_cost;
        self.water_cost       += other.water_cost;
        self.equal_share      += other.equal_share;
        self.proportional_fee += other.proportional_fee;
        self.total_bill       += other.total_bill;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingReport {
    pub period:   PeriodId,
    pub rows:     Vec<ReportRow>,
    pub totals:   ReportRow,
    pub expenses: CommonExpenses,
    pub tariffs:  TariffRates,
}

impl BillingReport {
    pub fn build(
        period: PeriodId,
        bills: &[CalculatedUnitBill],
        expenses: &CommonExpenses,
        tariffs: &TariffRates,
    ) -> Self {
        let rows: Vec<ReportRow> = bills.iter().map(ReportRow::from_bill).collect();
        let mut totals = ReportRow {
            label: "TOTAL".into(),
            ..ReportRow::default()
        };
        for row in &rows {
            totals.accumulate(row);
        }

        Self {
            period,
            rows,
            totals,
            expenses: expenses.clone(),
            tariffs: tariffs.clone(),
        }
    }

    /// Plain-text rendering for terminals and log files.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Water billing report: {}", self.period.display_label());
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<8} {:>10} {:>10} {:>9} {:>11} {:>11} {:>11} {:>10} {:>10} {:>11}",
            "Unit", "Prev m³", "Curr m³", "Cons m³", "Fixed", "Excess", "Water", "Common", "Services", "Total"
        );
        for row in self.rows.iter().chain(std::iter::once(&self.totals)) {
            let _ = writeln!(
                out,
                "{:<8} {:>10.0} {:>10.0} {:>9.2} {:>11} {:>11} {:>11} {:>10} {:>10} {:>11}",
                row.label,
                row.previous_reading,
                row.current_reading,
                row.consumption,
                money(row.fixed_share),
                money(row.excess_tier_cost),
                money(row.water_cost),
                money(row.equal_share),
                money(row.proportional_fee),
                money(row.total_bill),
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Tariff (sewer {:.0}% of water):", self.tariffs.sewer_rate_percentage);
        for tier in &self.tariffs.tiers {
            let _ = writeln!(
                out,
                "  {:<32} {:>8.2} m³  water {:>10}  sewer {:>10}  total {:>10}",
                tier.name,
                tier.volume,
                money(tier.water_cost),
                money(tier.sewer_cost.unwrap_or(0.0)),
                money(tier.total_cost.unwrap_or(0.0)),
            );
        }

        let e = &self.expenses;
        let _ = writeln!(out);
        let _ = writeln!(out, "Common expenses:");
        let _ = writeln!(out, "  garbage fee              {:>10}", money(e.garbage_fee));
        let _ = writeln!(out, "  garbage fee penalty      {:>10}", money(e.garbage_fee_penalty));
        let _ = writeln!(out, "  late payment adjustment  {:>10}", money(e.late_payment_adjustment));
        let _ = writeln!(out, "  water penalty            {:>10}", money(e.water_penalty));
        let _ = writeln!(out, "  other services (by area) {:>10}", money(e.other_services_fee));
        let _ = writeln!(out, "  utility invoice          {:>10}", money(e.total_utility_water_sewer_bill));
        out
    }
}

fn money(value: f64) -> String {
    format!("$ {value:.2}")
}
