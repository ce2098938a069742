use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, StudentId};

pub type ChargeId = Uuid;

/// One billing period's tuition obligation for a student.
/// A student holds at most one charge per due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub student_id: StudentId,
    /// Amount due in cents, fixed at creation time
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Charge {
    pub fn new(student_id: StudentId, amount_cents: Cents, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            amount_cents,
            due_date,
            created_at: Utc::now(),
        }
    }

    /// A charge is overdue once its due date is strictly in the past.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }

    /// Billing period label, e.g. "03/2024".
    pub fn period_label(&self) -> String {
        self.due_date.format("%m/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_is_strictly_before_today() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let charge = Charge::new(Uuid::new_v4(), 15000, due);

        assert!(!charge.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
        assert!(!charge.is_overdue(due));
        assert!(charge.is_overdue(NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()));
    }

    #[test]
    fn test_period_label() {
        let charge = Charge::new(
            Uuid::new_v4(),
            15000,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        );
        assert_eq!(charge.period_label(), "03/2024");
    }
}
