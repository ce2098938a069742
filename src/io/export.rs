use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{Action, CashRow, Role, StudioService};
use crate::domain::{format_cents, Charge, Payment, Student};

/// Database snapshot for full export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub students: Vec<Student>,
    pub charges: Vec<Charge>,
    pub payments: Vec<Payment>,
}

/// Exporter for converting studio records to flat formats
pub struct Exporter<'a> {
    service: &'a StudioService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a StudioService) -> Self {
        Self { service }
    }

    /// Export payments received between two optional dates (inclusive) to CSV,
    /// oldest first.
    pub async fn export_payments_csv<W: Write>(
        &self,
        writer: W,
        role: Role,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<usize> {
        let rows = self.service.cash_rows(role, from, to).await?;
        write_cash_rows_csv(writer, &rows)?;
        Ok(rows.len())
    }

    /// Export every student, charge and payment as a JSON snapshot
    pub async fn export_full_json<W: Write>(
        &self,
        mut writer: W,
        role: Role,
    ) -> Result<DatabaseSnapshot> {
        role.require(Action::ExportCash)?;

        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            students: self.service.list_students(None).await?,
            charges: self.service.list_all_charges().await?,
            payments: self.service.list_all_payments().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write payment rows as CSV with a `student,amount,method,date` header.
/// Used by the payments export and by the cash and closing reports.
pub fn write_cash_rows_csv<W: Write>(writer: W, rows: &[CashRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["student", "amount", "method", "date"])?;

    for row in rows {
        csv_writer.write_record([
            row.student_name.clone(),
            format_cents(row.amount),
            row.method.as_str().to_string(),
            row.date.format("%Y-%m-%d").to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the student roster as CSV.
pub fn write_students_csv<W: Write>(writer: W, students: &[Student]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "name",
        "guardian",
        "phone",
        "tuition",
        "due_day",
        "active",
        "special_needs",
    ])?;

    for s in students {
        csv_writer.write_record([
            s.id.to_string(),
            s.name.clone(),
            s.guardian.clone(),
            s.phone.clone().unwrap_or_default(),
            format_cents(s.tuition_cents),
            s.due_day.to_string(),
            s.active.to_string(),
            s.special_needs.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
