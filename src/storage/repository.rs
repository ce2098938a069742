use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Cents, Charge, ChargeId, ChargeStanding, MethodTotals, Payment, PaymentId, PaymentMethod,
    Student, StudentId,
};

use super::MIGRATION_001_INITIAL;

const STUDENT_COLUMNS: &str = "id, name, guardian, phone, birth_date, tuition_cents, due_day, active, special_needs, special_needs_note, notes, created_at";

/// A payment joined with the name of the student it belongs to, for cash
/// reports and exports.
#[derive(Debug, Clone)]
pub struct PaymentEntry {
    pub payment: Payment,
    pub student_name: String,
}

/// Repository for persisting and querying students, charges and payments.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL. Foreign keys are enforced on every
    /// pooled connection so deletes cascade.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Student operations
    // ========================

    pub async fn save_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO students (id, name, guardian, phone, birth_date, tuition_cents, due_day, active, special_needs, special_needs_note, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(student.id.to_string())
        .bind(&student.name)
        .bind(&student.guardian)
        .bind(&student.phone)
        .bind(student.birth_date.map(|d| d.to_string()))
        .bind(student.tuition_cents)
        .bind(i64::from(student.due_day))
        .bind(student.active)
        .bind(student.special_needs)
        .bind(&student.special_needs_note)
        .bind(&student.notes)
        .bind(student.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save student")?;
        Ok(())
    }

    /// Overwrite every mutable field of an existing student.
    pub async fn update_student(&self, student: &Student) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE students
            SET name = ?, guardian = ?, phone = ?, birth_date = ?, tuition_cents = ?, due_day = ?,
                active = ?, special_needs = ?, special_needs_note = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&student.name)
        .bind(&student.guardian)
        .bind(&student.phone)
        .bind(student.birth_date.map(|d| d.to_string()))
        .bind(student.tuition_cents)
        .bind(i64::from(student.due_day))
        .bind(student.active)
        .bind(student.special_needs)
        .bind(&student.special_needs_note)
        .bind(&student.notes)
        .bind(student.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update student")?;
        Ok(())
    }

    pub async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM students WHERE id = ?",
            STUDENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch student")?;

        row.as_ref().map(Self::row_to_student).transpose()
    }

    /// List students ordered by name, optionally filtered by a
    /// case-insensitive substring of the name.
    pub async fn list_students(&self, search: Option<&str>) -> Result<Vec<Student>> {
        let rows = match search {
            Some(term) => {
                sqlx::query(&format!(
                    "SELECT {} FROM students WHERE name LIKE ? ESCAPE '\\' ORDER BY name COLLATE NOCASE",
                    STUDENT_COLUMNS
                ))
                .bind(format!("%{}%", escape_like(term)))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM students ORDER BY name COLLATE NOCASE",
                    STUDENT_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list students")?;

        rows.iter().map(Self::row_to_student).collect()
    }

    /// Delete a student; charges and payments go with it.
    /// Returns false when no such student existed.
    pub async fn delete_student(&self, id: StudentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete student")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_special_needs(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM students WHERE special_needs = 1")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count special needs students")?;
        Ok(row.get("count"))
    }

    /// Students born on the same day and month as `day`.
    pub async fn list_birthdays(&self, day: NaiveDate, active_only: bool) -> Result<Vec<Student>> {
        let mut query = format!(
            "SELECT {} FROM students WHERE birth_date IS NOT NULL AND strftime('%m-%d', birth_date) = ?",
            STUDENT_COLUMNS
        );
        if active_only {
            query.push_str(" AND active = 1");
        }
        query.push_str(" ORDER BY name COLLATE NOCASE");

        let rows = sqlx::query(&query)
            .bind(day.format("%m-%d").to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list birthdays")?;

        rows.iter().map(Self::row_to_student).collect()
    }

    fn row_to_student(row: &SqliteRow) -> Result<Student> {
        let id_str: String = row.get("id");
        let birth_date_str: Option<String> = row.get("birth_date");
        let created_at_str: String = row.get("created_at");
        let due_day: i64 = row.get("due_day");

        Ok(Student {
            id: Uuid::parse_str(&id_str).context("Invalid student ID")?,
            name: row.get("name"),
            guardian: row.get("guardian"),
            phone: row.get("phone"),
            birth_date: birth_date_str
                .as_deref()
                .map(parse_day)
                .transpose()
                .context("Invalid birth date")?,
            tuition_cents: row.get("tuition_cents"),
            due_day: u32::try_from(due_day).context("Invalid due day")?,
            active: row.get::<i32, _>("active") != 0,
            special_needs: row.get::<i32, _>("special_needs") != 0,
            special_needs_note: row.get("special_needs_note"),
            notes: row.get("notes"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Charge operations
    // ========================

    /// Save a charge unless the student already has one on that due date.
    /// Returns `false` when the natural key was taken, so concurrent callers
    /// race on the unique index rather than on a prior read.
    pub async fn save_charge_if_absent(&self, charge: &Charge) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO charges (id, student_id, amount_cents, due_date, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (student_id, due_date) DO NOTHING
            "#,
        )
        .bind(charge.id.to_string())
        .bind(charge.student_id.to_string())
        .bind(charge.amount_cents)
        .bind(charge.due_date.to_string())
        .bind(charge.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save charge")?;
        Ok(result.rows_affected() == 1)
    }

    /// Insert each charge unless the student already has one on that due date.
    /// Existing charges are left untouched. Runs in a single transaction and
    /// returns how many rows were actually inserted.
    pub async fn insert_charges_if_absent(&self, charges: &[Charge]) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let mut created = 0;
        for charge in charges {
            let result = sqlx::query(
                r#"
                INSERT INTO charges (id, student_id, amount_cents, due_date, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT (student_id, due_date) DO NOTHING
                "#,
            )
            .bind(charge.id.to_string())
            .bind(charge.student_id.to_string())
            .bind(charge.amount_cents)
            .bind(charge.due_date.to_string())
            .bind(charge.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .context("Failed to insert charge")?;

            created += result.rows_affected() as usize;
        }

        tx.commit().await.context("Failed to commit charges")?;
        Ok(created)
    }

    pub async fn get_charge(&self, id: ChargeId) -> Result<Option<Charge>> {
        let row = sqlx::query(
            "SELECT id, student_id, amount_cents, due_date, created_at FROM charges WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch charge")?;

        row.as_ref().map(Self::row_to_charge).transpose()
    }

    /// All charges, oldest due date first.
    pub async fn list_charges(&self) -> Result<Vec<Charge>> {
        let rows = sqlx::query(
            "SELECT id, student_id, amount_cents, due_date, created_at FROM charges ORDER BY due_date, student_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list charges")?;

        rows.iter().map(Self::row_to_charge).collect()
    }

    /// Charges of one student, most recent due date first.
    pub async fn list_charges_for_student(&self, student_id: StudentId) -> Result<Vec<Charge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, amount_cents, due_date, created_at
            FROM charges
            WHERE student_id = ?
            ORDER BY due_date DESC
            "#,
        )
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list charges for student")?;

        rows.iter().map(Self::row_to_charge).collect()
    }

    /// Delete a charge; its payments go with it.
    pub async fn delete_charge(&self, id: ChargeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM charges WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete charge")?;
        Ok(result.rows_affected() > 0)
    }

    /// Charges due strictly before `due_before`, joined with the sum and
    /// count of their payments.
    pub async fn list_charge_standings(&self, due_before: NaiveDate) -> Result<Vec<ChargeStanding>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.student_id, c.amount_cents, c.due_date,
                   COALESCE(SUM(p.amount_cents), 0) as paid_cents,
                   COUNT(p.id) as payment_count
            FROM charges c
            LEFT JOIN payments p ON p.charge_id = c.id
            WHERE c.due_date < ?
            GROUP BY c.id, c.student_id, c.amount_cents, c.due_date
            ORDER BY c.due_date DESC
            "#,
        )
        .bind(due_before.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list charge standings")?;

        rows.iter()
            .map(|row| {
                let id_str: String = row.get("id");
                let student_id_str: String = row.get("student_id");
                let due_date_str: String = row.get("due_date");
                Ok(ChargeStanding {
                    charge_id: Uuid::parse_str(&id_str).context("Invalid charge ID")?,
                    student_id: Uuid::parse_str(&student_id_str).context("Invalid student ID")?,
                    amount_cents: row.get("amount_cents"),
                    due_date: parse_day(&due_date_str).context("Invalid due date")?,
                    paid_cents: row.get("paid_cents"),
                    payment_count: row.get("payment_count"),
                })
            })
            .collect()
    }

    fn row_to_charge(row: &SqliteRow) -> Result<Charge> {
        let id_str: String = row.get("id");
        let student_id_str: String = row.get("student_id");
        let due_date_str: String = row.get("due_date");
        let created_at_str: String = row.get("created_at");

        Ok(Charge {
            id: Uuid::parse_str(&id_str).context("Invalid charge ID")?,
            student_id: Uuid::parse_str(&student_id_str).context("Invalid student ID")?,
            amount_cents: row.get("amount_cents"),
            due_date: parse_day(&due_date_str).context("Invalid due date")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Payment operations
    // ========================

    pub async fn save_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, charge_id, amount_cents, method, paid_on, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.charge_id.to_string())
        .bind(payment.amount_cents)
        .bind(payment.method.as_str())
        .bind(payment.paid_on.to_string())
        .bind(payment.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save payment")?;
        Ok(())
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            "SELECT id, charge_id, amount_cents, method, paid_on, recorded_at FROM payments WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch payment")?;

        row.as_ref().map(Self::row_to_payment).transpose()
    }

    pub async fn list_payments_for_charge(&self, charge_id: ChargeId) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, charge_id, amount_cents, method, paid_on, recorded_at
            FROM payments
            WHERE charge_id = ?
            ORDER BY paid_on, recorded_at
            "#,
        )
        .bind(charge_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments for charge")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT id, charge_id, amount_cents, method, paid_on, recorded_at FROM payments ORDER BY paid_on, recorded_at",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;

        rows.iter().map(Self::row_to_payment).collect()
    }

    /// Payments with their student, within optional half-open date bounds
    /// `[start, end)`.
    pub async fn list_payment_entries(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        newest_first: bool,
    ) -> Result<Vec<PaymentEntry>> {
        let mut query = String::from(
            r#"
            SELECT p.id, p.charge_id, p.amount_cents, p.method, p.paid_on, p.recorded_at,
                   s.name as student_name
            FROM payments p
            JOIN charges c ON c.id = p.charge_id
            JOIN students s ON s.id = c.student_id
            WHERE 1=1
            "#,
        );

        let start_str = start.map(|d| d.to_string());
        let end_str = end.map(|d| d.to_string());

        if start.is_some() {
            query.push_str(" AND p.paid_on >= ?");
        }
        if end.is_some() {
            query.push_str(" AND p.paid_on < ?");
        }
        if newest_first {
            query.push_str(" ORDER BY p.paid_on DESC, p.recorded_at DESC");
        } else {
            query.push_str(" ORDER BY p.paid_on, p.recorded_at");
        }

        let mut sql_query = sqlx::query(&query);
        if let Some(ref s) = start_str {
            sql_query = sql_query.bind(s);
        }
        if let Some(ref e) = end_str {
            sql_query = sql_query.bind(e);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list payment entries")?;

        rows.iter()
            .map(|row| {
                Ok(PaymentEntry {
                    payment: Self::row_to_payment(row)?,
                    student_name: row.get("student_name"),
                })
            })
            .collect()
    }

    /// Sum of payments received in `[start, end)`. Zero when nothing matches.
    pub async fn sum_payments(&self, start: NaiveDate, end: NaiveDate) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM payments
            WHERE paid_on >= ? AND paid_on < ?
            "#,
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum payments")?;

        Ok(row.get("total"))
    }

    /// Sums of payments received in `[start, end)` per method.
    pub async fn sum_payments_by_method(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MethodTotals> {
        let rows = sqlx::query(
            r#"
            SELECT method, COALESCE(SUM(amount_cents), 0) as total
            FROM payments
            WHERE paid_on >= ? AND paid_on < ?
            GROUP BY method
            "#,
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum payments by method")?;

        let mut totals = MethodTotals::default();
        for row in rows {
            let method_str: String = row.get("method");
            let method = method_str
                .parse::<PaymentMethod>()
                .context("Invalid payment method")?;
            totals.add(method, row.get("total"));
        }
        Ok(totals)
    }

    /// `(month, total)` for every month of `year` that has payments.
    pub async fn sum_payments_by_month(&self, year: i32) -> Result<Vec<(u32, Cents)>> {
        let rows = sqlx::query(
            r#"
            SELECT CAST(strftime('%m', paid_on) AS INTEGER) as month,
                   COALESCE(SUM(amount_cents), 0) as total
            FROM payments
            WHERE strftime('%Y', paid_on) = ?
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(format!("{:04}", year))
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum payments by month")?;

        rows.iter()
            .map(|row| {
                let month: i64 = row.get("month");
                Ok((
                    u32::try_from(month).context("Invalid month")?,
                    row.get("total"),
                ))
            })
            .collect()
    }

    fn row_to_payment(row: &SqliteRow) -> Result<Payment> {
        let id_str: String = row.get("id");
        let charge_id_str: String = row.get("charge_id");
        let method_str: String = row.get("method");
        let paid_on_str: String = row.get("paid_on");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(Payment {
            id: Uuid::parse_str(&id_str).context("Invalid payment ID")?,
            charge_id: Uuid::parse_str(&charge_id_str).context("Invalid charge ID")?,
            amount_cents: row.get("amount_cents"),
            method: method_str
                .parse::<PaymentMethod>()
                .context("Invalid payment method")?,
            paid_on: parse_day(&paid_on_str).context("Invalid payment date")?,
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date '{}'", s))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
