use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, Charge, MethodTotals, Payment, PaymentMethod, Student};

/// Front page figures for the studio owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub as_of: NaiveDate,
    pub received_today: Cents,
    pub received_this_month: Cents,
    pub received_this_year: Cents,
    pub today_by_method: MethodTotals,
    /// Open balance of every charge due before today
    pub overdue_total: Cents,
    /// Students with an overdue charge that received no payment at all
    pub delinquent_students: usize,
    pub special_needs_students: i64,
    pub birthdays: Vec<Student>,
    /// Trailing six calendar months, oldest first
    pub revenue_chart: Vec<RevenuePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub label: String,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSeries {
    pub year: i32,
    /// Index 0 is January
    pub months: [Cents; 12],
    pub total: Cents,
}

/// Every payment in a date window, with totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashReport {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Newest first
    pub payments: Vec<CashRow>,
    pub total: Cents,
    pub by_method: MethodTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyClosing {
    pub year: i32,
    pub month: u32,
    /// Oldest first
    pub payments: Vec<CashRow>,
    pub total: Cents,
}

/// A payment flattened for tabular output and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRow {
    pub student_name: String,
    pub amount: Cents,
    pub method: PaymentMethod,
    pub date: NaiveDate,
}

/// A student's account: every charge with what was paid and what is owed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentStatement {
    pub student: Student,
    /// Most recent due date first
    pub charges: Vec<ChargeStatus>,
    pub total_open: Cents,
    pub total_overdue: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeStatus {
    pub charge: Charge,
    pub payments: Vec<Payment>,
    pub paid: Cents,
    pub open_balance: Cents,
    pub overdue: bool,
}
