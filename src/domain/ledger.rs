use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{sum_cents, Cents, Charge, ChargeId, Payment, StudentId};

/// Sum of payment amounts. No payments means nothing paid.
pub fn total_paid<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Cents {
    sum_cents(payments.into_iter().map(|p| p.amount_cents))
}

/// Amount still owed on a charge: `max(amount_due - sum(payments), 0)`.
///
/// Overpayment floors at zero; the surplus is not carried to other charges.
pub fn open_balance(amount_due: Cents, payment_amounts: impl IntoIterator<Item = Cents>) -> Cents {
    amount_due.saturating_sub(sum_cents(payment_amounts)).max(0)
}

/// Open balance of `charge`, counting only the payments recorded against it.
pub fn charge_balance(charge: &Charge, payments: &[Payment]) -> Cents {
    open_balance(
        charge.amount_cents,
        payments
            .iter()
            .filter(|p| p.charge_id == charge.id)
            .map(|p| p.amount_cents),
    )
}

/// A charge together with the aggregate of its payments, as loaded for
/// balance and delinquency reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeStanding {
    pub charge_id: ChargeId,
    pub student_id: StudentId,
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
    pub paid_cents: Cents,
    pub payment_count: i64,
}

impl ChargeStanding {
    pub fn from_payments(charge: &Charge, payments: &[Payment]) -> Self {
        let own: Vec<&Payment> = payments
            .iter()
            .filter(|p| p.charge_id == charge.id)
            .collect();
        Self {
            charge_id: charge.id,
            student_id: charge.student_id,
            amount_cents: charge.amount_cents,
            due_date: charge.due_date,
            paid_cents: total_paid(own.iter().copied()),
            payment_count: own.len() as i64,
        }
    }

    pub fn open_balance(&self) -> Cents {
        open_balance(self.amount_cents, [self.paid_cents])
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }

    /// Overdue with no payment attempt at all. A partial payment clears this
    /// flag even when a balance remains.
    pub fn is_unpaid_overdue(&self, today: NaiveDate) -> bool {
        self.is_overdue(today) && self.payment_count == 0
    }
}

/// Sum of the positive open balances of every charge due before `today`.
pub fn overdue_total(standings: &[ChargeStanding], today: NaiveDate) -> Cents {
    sum_cents(
        standings
            .iter()
            .filter(|s| s.is_overdue(today))
            .map(ChargeStanding::open_balance)
            .filter(|balance| *balance > 0),
    )
}

/// Distinct students holding at least one overdue charge with zero payments.
///
/// Uses a narrower predicate than [`overdue_total`]: partially paid charges
/// count toward the overdue total but never make a student delinquent.
pub fn delinquent_students(standings: &[ChargeStanding], today: NaiveDate) -> HashSet<StudentId> {
    standings
        .iter()
        .filter(|s| s.is_unpaid_overdue(today))
        .map(|s| s.student_id)
        .collect()
}

/// Spread `(month, total)` pairs over a January-first series of twelve,
/// leaving zero for months without payments. Months outside 1-12 are ignored.
pub fn monthly_series(totals: impl IntoIterator<Item = (u32, Cents)>) -> [Cents; 12] {
    let mut series: [Cents; 12] = [0; 12];
    for (month, total) in totals {
        if (1..=12).contains(&month) {
            let slot = &mut series[(month - 1) as usize];
            *slot = slot.saturating_add(total);
        }
    }
    series
}
