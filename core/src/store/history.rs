use super::{BillingStore, MonthlyRecordRow};
use crate::{aggregation::MonthlyRecord, error::BillingResult, period::PeriodId};
use rusqlite::{params, OptionalExtension};

impl BillingStore {
    /// Insert the record, replacing any earlier record for the same period.
    pub fn upsert_monthly_record(&self, record: &MonthlyRecord) -> BillingResult<()> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO monthly_record
             (period, total_reading, total_consumption, total_bill, average_bill, payload, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(period) DO UPDATE SET
                total_reading     = excluded.total_reading,
                total_consumption = excluded.total_consumption,
                total_bill        = excluded.total_bill,
                average_bill      = excluded.average_bill,
                payload           = excluded.payload,
                saved_at          = excluded.saved_at",
            params![
                record.period.to_string(),
                record.totals.total_reading,
                record.totals.total_consumption,
                record.totals.total_bill,
                record.totals.average_bill,
                payload,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn monthly_record(&self, period: &PeriodId) -> BillingResult<Option<MonthlyRecord>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM monthly_record WHERE period = ?1",
                params![period.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Every stored record, newest period first.
    pub fn monthly_records(&self) -> BillingResult<Vec<MonthlyRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM monthly_record ORDER BY period DESC")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(payloads.len());
        for json in payloads {
            records.push(serde_json::from_str(&json)?);
        }
        Ok(records)
    }

    /// Summary rows for listing, newest period first.
    pub fn monthly_record_rows(&self) -> BillingResult<Vec<MonthlyRecordRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT period, total_reading, total_consumption, total_bill, average_bill, saved_at
             FROM monthly_record ORDER BY period DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MonthlyRecordRow {
                    period:            row.get(0)?,
                    total_reading:     row.get(1)?,
                    total_consumption: row.get(2)?,
                    total_bill:        row.get(3)?,
                    average_bill:      row.get(4)?,
                    saved_at:          row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Returns true when a record was removed.
    pub fn delete_monthly_record(&self, period: &PeriodId) -> BillingResult<bool> {
        let n = self.conn.execute(
            "DELETE FROM monthly_record WHERE period = ?1",
            params![period.to_string()],
        )?;
        Ok(n > 0)
    }

    pub fn monthly_record_count(&self) -> BillingResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM monthly_record", [], |row| row.get(0))?;
        Ok(count)
    }
}
