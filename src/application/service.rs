use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{
    birthday_text, charge_balance, delinquent_students, due_reminder_text, monthly_series,
    overdue_total, plan_year_charges, receipt_text, sum_cents, Cents, Charge, ChargeId,
    ChargeStanding, MethodTotals, MAX_AMOUNT_CENTS, OutgoingMessage, Payment, PaymentId, PaymentMethod, Period,
    Student, StudentId, DEFAULT_COUNTRY_CODE, DEFAULT_DUE_DAY,
};
use crate::storage::{PaymentEntry, Repository};

use super::{
    Action, AppError, CashReport, CashRow, ChargeStatus, DashboardReport, MonthlyClosing,
    RevenuePoint, RevenueSeries, Role, StudentStatement,
};

/// Months shown on the dashboard revenue chart.
const CHART_MONTHS: u32 = 6;

/// Application service providing every studio operation.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct StudioService {
    repo: Repository,
    messaging: MessagingConfig,
}

/// Settings used when composing messages to guardians.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Prefixed to phone numbers that do not start with it
    pub country_code: String,
    pub studio_name: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            studio_name: "the studio".to_string(),
        }
    }
}

/// Input for registering a student
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub guardian: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub tuition_cents: Cents,
    /// Defaults to the 5th
    pub due_day: Option<u32>,
    pub inactive: bool,
    pub special_needs: bool,
    pub special_needs_note: Option<String>,
    pub notes: Option<String>,
}

/// Partial update of a student. `None` keeps the stored value; an empty
/// string clears an optional text field and `Some(None)` clears the birth date.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub guardian: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub tuition_cents: Option<Cents>,
    pub due_day: Option<u32>,
    pub active: Option<bool>,
    pub special_needs: Option<bool>,
    pub special_needs_note: Option<String>,
    pub notes: Option<String>,
}

/// Result of generating a year of charges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub year: i32,
    pub created: usize,
    /// Months that already had a charge on the computed date
    pub skipped: usize,
}

/// Result of recording a payment
pub struct PaymentResult {
    pub payment: Payment,
    pub student_name: String,
    /// What is still owed on the charge after this payment
    pub open_balance: Cents,
}

impl StudioService {
    /// Create a new studio service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            messaging: MessagingConfig::default(),
        }
    }

    pub fn with_messaging(mut self, messaging: MessagingConfig) -> Self {
        self.messaging = messaging;
        self
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Student operations
    // ========================

    pub async fn register_student(&self, input: NewStudent) -> Result<Student, AppError> {
        let mut student = Student::new(
            input.name.trim().to_string(),
            input.guardian.trim().to_string(),
            input.tuition_cents,
            input.due_day.unwrap_or(DEFAULT_DUE_DAY),
        );
        student.phone = non_blank(input.phone);
        student.birth_date = input.birth_date;
        student.active = !input.inactive;
        student.special_needs = input.special_needs;
        student.special_needs_note = non_blank(input.special_needs_note);
        student.notes = non_blank(input.notes);

        student.validate()?;
        self.repo.save_student(&student).await?;

        info!(student = %student.id, name = %student.name, "registered student");
        Ok(student)
    }

    pub async fn update_student(
        &self,
        id: StudentId,
        update: StudentUpdate,
    ) -> Result<Student, AppError> {
        let mut student = self.get_student(id).await?;

        if let Some(name) = update.name {
            student.name = name.trim().to_string();
        }
        if let Some(guardian) = update.guardian {
            student.guardian = guardian.trim().to_string();
        }
        if let Some(phone) = update.phone {
            student.phone = non_blank(Some(phone));
        }
        if let Some(birth_date) = update.birth_date {
            student.birth_date = birth_date;
        }
        if let Some(tuition) = update.tuition_cents {
            student.tuition_cents = tuition;
        }
        if let Some(day) = update.due_day {
            student.due_day = day;
        }
        if let Some(active) = update.active {
            student.active = active;
        }
        if let Some(special_needs) = update.special_needs {
            student.special_needs = special_needs;
        }
        if let Some(note) = update.special_needs_note {
            student.special_needs_note = non_blank(Some(note));
        }
        if let Some(notes) = update.notes {
            student.notes = non_blank(Some(notes));
        }

        student.validate()?;
        self.repo.update_student(&student).await?;

        info!(student = %student.id, "updated student");
        Ok(student)
    }

    pub async fn get_student(&self, id: StudentId) -> Result<Student, AppError> {
        self.repo
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::StudentNotFound(id.to_string()))
    }

    /// List students ordered by name, optionally filtered by name.
    pub async fn list_students(&self, search: Option<&str>) -> Result<Vec<Student>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.repo.list_students(search).await?)
    }

    /// Delete a student together with all charges and payments.
    pub async fn delete_student(&self, role: Role, id: StudentId) -> Result<Student, AppError> {
        role.require(Action::DeleteStudent)?;
        let student = self.get_student(id).await?;
        self.repo.delete_student(id).await?;

        info!(student = %id, name = %student.name, "deleted student");
        Ok(student)
    }

    /// Every charge of a student with its payments and balance.
    pub async fn student_statement(
        &self,
        id: StudentId,
        today: NaiveDate,
    ) -> Result<StudentStatement, AppError> {
        let student = self.get_student(id).await?;
        let charges = self.repo.list_charges_for_student(id).await?;

        let mut statuses = Vec::with_capacity(charges.len());
        for charge in charges {
            let payments = self.repo.list_payments_for_charge(charge.id).await?;
            let standing = ChargeStanding::from_payments(&charge, &payments);
            statuses.push(ChargeStatus {
                paid: standing.paid_cents,
                open_balance: standing.open_balance(),
                overdue: charge.is_overdue(today),
                charge,
                payments,
            });
        }

        let total_open = sum_cents(statuses.iter().map(|s| s.open_balance));
        let total_overdue = sum_cents(
            statuses
                .iter()
                .filter(|s| s.overdue)
                .map(|s| s.open_balance),
        );

        Ok(StudentStatement {
            student,
            charges: statuses,
            total_open,
            total_overdue,
        })
    }

    // ========================
    // Charge operations
    // ========================

    /// Create a single charge. The amount defaults to the student's tuition.
    pub async fn create_charge(
        &self,
        student_id: StudentId,
        amount_cents: Option<Cents>,
        due_date: NaiveDate,
    ) -> Result<Charge, AppError> {
        let student = self.get_student(student_id).await?;
        let amount = amount_cents.unwrap_or(student.tuition_cents);
        if amount < 0 {
            return Err(AppError::InvalidAmount(
                "Charge amount cannot be negative".to_string(),
            ));
        }
        if amount > MAX_AMOUNT_CENTS {
            return Err(AppError::InvalidAmount(
                "Charge amount cannot exceed 999999.99".to_string(),
            ));
        }

        // The insert is the existence check, so two concurrent requests for
        // the same date cannot both succeed.
        let charge = Charge::new(student_id, amount, due_date);
        if !self.repo.save_charge_if_absent(&charge).await? {
            return Err(AppError::ChargeAlreadyExists {
                student: student.name,
                due_date,
            });
        }

        info!(charge = %charge.id, student = %student_id, due = %due_date, "created charge");
        Ok(charge)
    }

    /// Create the monthly charges of `year` that do not exist yet.
    ///
    /// Fails without touching the database when the student has no tuition
    /// or due day. Existing charges keep their original amount.
    pub async fn generate_year_charges(
        &self,
        student_id: StudentId,
        year: i32,
    ) -> Result<GenerationResult, AppError> {
        let student = self.get_student(student_id).await?;
        let planned =
            plan_year_charges(&student, year).map_err(|reason| AppError::BillingNotConfigured {
                student: student.name.clone(),
                reason,
            })?;

        let created = self.repo.insert_charges_if_absent(&planned).await?;
        let result = GenerationResult {
            year,
            created,
            skipped: planned.len() - created,
        };

        info!(
            student = %student_id,
            year,
            created = result.created,
            skipped = result.skipped,
            "generated yearly charges"
        );
        Ok(result)
    }

    pub async fn get_charge(&self, id: ChargeId) -> Result<Charge, AppError> {
        self.repo
            .get_charge(id)
            .await?
            .ok_or_else(|| AppError::ChargeNotFound(id.to_string()))
    }

    /// Open balance of a charge, recomputed from its payments.
    pub async fn charge_balance(&self, id: ChargeId) -> Result<Cents, AppError> {
        let charge = self.get_charge(id).await?;
        let payments = self.repo.list_payments_for_charge(id).await?;
        Ok(charge_balance(&charge, &payments))
    }

    /// Delete a charge and its payments.
    pub async fn delete_charge(&self, role: Role, id: ChargeId) -> Result<Charge, AppError> {
        role.require(Action::DeleteCharge)?;
        let charge = self.get_charge(id).await?;
        self.repo.delete_charge(id).await?;

        info!(charge = %id, student = %charge.student_id, "deleted charge");
        Ok(charge)
    }

    // ========================
    // Payment operations
    // ========================

    pub async fn record_payment(
        &self,
        charge_id: ChargeId,
        amount_cents: Cents,
        method: PaymentMethod,
        paid_on: NaiveDate,
    ) -> Result<PaymentResult, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Payment amount must be positive".to_string(),
            ));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(AppError::InvalidAmount(
                "Payment amount cannot exceed 999999.99".to_string(),
            ));
        }

        let charge = self.get_charge(charge_id).await?;
        let student = self.get_student(charge.student_id).await?;

        let payment = Payment::new(charge_id, amount_cents, method, paid_on);
        self.repo.save_payment(&payment).await?;

        let payments = self.repo.list_payments_for_charge(charge_id).await?;
        let open_balance = charge_balance(&charge, &payments);

        info!(
            payment = %payment.id,
            charge = %charge_id,
            amount = amount_cents,
            method = %method,
            open_balance,
            "recorded payment"
        );

        Ok(PaymentResult {
            payment,
            student_name: student.name,
            open_balance,
        })
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(id.to_string()))
    }

    pub async fn list_payments_for_charge(
        &self,
        charge_id: ChargeId,
    ) -> Result<Vec<Payment>, AppError> {
        self.get_charge(charge_id).await?;
        Ok(self.repo.list_payments_for_charge(charge_id).await?)
    }

    // ========================
    // Aggregations
    // ========================

    /// Total received within a period. Zero when nothing was received.
    pub async fn period_revenue(&self, role: Role, period: Period) -> Result<Cents, AppError> {
        role.require(Action::ViewFinancials)?;
        let (start, end) = period.bounds();
        Ok(self.repo.sum_payments(start, end).await?)
    }

    /// Totals received within a period for each payment method.
    pub async fn revenue_by_method(
        &self,
        role: Role,
        period: Period,
    ) -> Result<MethodTotals, AppError> {
        role.require(Action::ViewFinancials)?;
        let (start, end) = period.bounds();
        Ok(self.repo.sum_payments_by_method(start, end).await?)
    }

    /// Twelve monthly totals for `year`, January first.
    pub async fn revenue_series(&self, role: Role, year: i32) -> Result<RevenueSeries, AppError> {
        role.require(Action::ViewFinancials)?;
        let months = monthly_series(self.repo.sum_payments_by_month(year).await?);
        Ok(RevenueSeries {
            year,
            months,
            total: sum_cents(months.iter().copied()),
        })
    }

    /// Sum of open balances over every charge due before `today`.
    pub async fn overdue_total(&self, role: Role, today: NaiveDate) -> Result<Cents, AppError> {
        role.require(Action::ViewFinancials)?;
        let standings = self.overdue_standings(today).await?;
        Ok(overdue_total(&standings, today))
    }

    /// Students with at least one overdue charge that has no payment at all.
    pub async fn delinquent_count(&self, role: Role, today: NaiveDate) -> Result<usize, AppError> {
        role.require(Action::ViewFinancials)?;
        let standings = self.overdue_standings(today).await?;
        Ok(delinquent_students(&standings, today).len())
    }

    async fn overdue_standings(&self, today: NaiveDate) -> Result<Vec<ChargeStanding>, AppError> {
        Ok(self.repo.list_charge_standings(today).await?)
    }

    /// Students whose birthday is `today`.
    pub async fn birthdays(
        &self,
        today: NaiveDate,
        active_only: bool,
    ) -> Result<Vec<Student>, AppError> {
        Ok(self.repo.list_birthdays(today, active_only).await?)
    }

    pub async fn special_needs_count(&self) -> Result<i64, AppError> {
        Ok(self.repo.count_special_needs().await?)
    }

    // ========================
    // Reports
    // ========================

    pub async fn dashboard(&self, role: Role, today: NaiveDate) -> Result<DashboardReport, AppError> {
        role.require(Action::ViewFinancials)?;

        let received_today = self.period_revenue(role, Period::Day(today)).await?;
        let received_this_month = self.period_revenue(role, Period::month_of(today)).await?;
        let received_this_year = self.period_revenue(role, Period::year_of(today)).await?;
        let today_by_method = self.revenue_by_method(role, Period::Day(today)).await?;

        let standings = self.overdue_standings(today).await?;
        let overdue = overdue_total(&standings, today);
        let delinquent = delinquent_students(&standings, today).len();

        let mut revenue_chart = Vec::with_capacity(CHART_MONTHS as usize);
        for month in Period::trailing_months(today, CHART_MONTHS) {
            let (start, end) = month.bounds();
            revenue_chart.push(RevenuePoint {
                label: month.label(),
                total: self.repo.sum_payments(start, end).await?,
            });
        }

        debug!(%today, overdue, delinquent, "computed dashboard");

        Ok(DashboardReport {
            as_of: today,
            received_today,
            received_this_month,
            received_this_year,
            today_by_method,
            overdue_total: overdue,
            delinquent_students: delinquent,
            special_needs_students: self.special_needs_count().await?,
            birthdays: self.birthdays(today, false).await?,
            revenue_chart,
        })
    }

    /// Payments between two optional dates (inclusive), newest first.
    pub async fn cash_report(
        &self,
        role: Role,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<CashReport, AppError> {
        role.require(Action::ViewFinancials)?;
        check_range(from, to)?;

        let entries = self
            .repo
            .list_payment_entries(from, to.and_then(|d| d.succ_opt()), true)
            .await?;

        let by_method: MethodTotals = entries.iter().map(|e| &e.payment).collect();
        let payments: Vec<CashRow> = entries.into_iter().map(CashRow::from).collect();

        Ok(CashReport {
            from_date: from,
            to_date: to,
            total: by_method.total(),
            payments,
            by_method,
        })
    }

    /// Payments received in one calendar month, oldest first.
    pub async fn monthly_closing(
        &self,
        role: Role,
        year: i32,
        month: u32,
    ) -> Result<MonthlyClosing, AppError> {
        role.require(Action::ViewFinancials)?;
        let period = Period::month(year, month)
            .ok_or_else(|| AppError::InvalidPeriod(format!("{}-{:02}", year, month)))?;
        let (start, end) = period.bounds();

        let payments: Vec<CashRow> = self
            .repo
            .list_payment_entries(Some(start), Some(end), false)
            .await?
            .into_iter()
            .map(CashRow::from)
            .collect();

        Ok(MonthlyClosing {
            year,
            month,
            total: sum_cents(payments.iter().map(|p| p.amount)),
            payments,
        })
    }

    /// Payment rows for export, oldest first.
    pub async fn cash_rows(
        &self,
        role: Role,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CashRow>, AppError> {
        role.require(Action::ExportCash)?;
        check_range(from, to)?;

        Ok(self
            .repo
            .list_payment_entries(from, to.and_then(|d| d.succ_opt()), false)
            .await?
            .into_iter()
            .map(CashRow::from)
            .collect())
    }

    pub async fn list_all_charges(&self) -> Result<Vec<Charge>, AppError> {
        Ok(self.repo.list_charges().await?)
    }

    pub async fn list_all_payments(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.repo.list_payments().await?)
    }

    // ========================
    // Messaging
    // ========================

    /// Birthday greeting for a student, if the student has a phone.
    pub async fn birthday_message(
        &self,
        student_id: StudentId,
    ) -> Result<Option<OutgoingMessage>, AppError> {
        let student = self.get_student(student_id).await?;
        let text = birthday_text(&student, &self.messaging.studio_name);
        Ok(OutgoingMessage::for_student(
            &student,
            &self.messaging.country_code,
            text,
        ))
    }

    /// Due date reminder for a charge.
    pub async fn due_reminder_message(
        &self,
        charge_id: ChargeId,
    ) -> Result<Option<OutgoingMessage>, AppError> {
        let charge = self.get_charge(charge_id).await?;
        let student = self.get_student(charge.student_id).await?;
        let text = due_reminder_text(&student, &charge);
        Ok(OutgoingMessage::for_student(
            &student,
            &self.messaging.country_code,
            text,
        ))
    }

    /// Receipt for a recorded payment.
    pub async fn receipt_message(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<OutgoingMessage>, AppError> {
        let payment = self.get_payment(payment_id).await?;
        let charge = self.get_charge(payment.charge_id).await?;
        let student = self.get_student(charge.student_id).await?;
        let text = receipt_text(&student, &charge, &payment);
        Ok(OutgoingMessage::for_student(
            &student,
            &self.messaging.country_code,
            text,
        ))
    }

    pub async fn birthday_link(&self, student_id: StudentId) -> Result<Option<String>, AppError> {
        Ok(self.birthday_message(student_id).await?.map(|m| m.link()))
    }

    pub async fn due_reminder_link(&self, charge_id: ChargeId) -> Result<Option<String>, AppError> {
        Ok(self.due_reminder_message(charge_id).await?.map(|m| m.link()))
    }

    pub async fn receipt_link(&self, payment_id: PaymentId) -> Result<Option<String>, AppError> {
        Ok(self.receipt_message(payment_id).await?.map(|m| m.link()))
    }
}

impl From<PaymentEntry> for CashRow {
    fn from(entry: PaymentEntry) -> Self {
        CashRow {
            student_name: entry.student_name,
            amount: entry.payment.amount_cents,
            method: entry.payment.method,
            date: entry.payment.paid_on,
        }
    }
}

fn check_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), AppError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(AppError::InvalidPeriod(format!(
            "start {} is after end {}",
            from, to
        ))),
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
