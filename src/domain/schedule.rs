use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use super::{Charge, Student};

/// Due date for `due_day` in the given month, clamped to the month's last day
/// (day 31 in February lands on the 28th or 29th).
pub fn clamped_due_date(year: i32, month: u32, due_day: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())?;
    first.with_day(due_day.clamp(1, last_day))
}

/// The twelve due dates of `year`, January first.
pub fn yearly_due_dates(year: i32, due_day: u32) -> Vec<NaiveDate> {
    (1..=12)
        .filter_map(|month| clamped_due_date(year, month, due_day))
        .collect()
}

/// Build the twelve monthly charges of `year` for a student, each carrying the
/// student's current tuition.
///
/// Refuses the whole year when billing is not configured; nothing is returned
/// partially. Deduplication against stored charges is the caller's job.
pub fn plan_year_charges(student: &Student, year: i32) -> Result<Vec<Charge>, GenerationError> {
    if student.tuition_cents <= 0 {
        return Err(GenerationError::MissingTuition);
    }
    if !(1..=31).contains(&student.due_day) {
        return Err(GenerationError::InvalidDueDay(student.due_day));
    }

    Ok(yearly_due_dates(year, student.due_day)
        .into_iter()
        .map(|due_date| Charge::new(student.id, student.tuition_cents, due_date))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("monthly tuition must be greater than zero")]
    MissingTuition,
    #[error("due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_clamp_to_end_of_february() {
        assert_eq!(clamped_due_date(2024, 2, 31), Some(date("2024-02-29")));
        assert_eq!(clamped_due_date(2023, 2, 31), Some(date("2023-02-28")));
        assert_eq!(clamped_due_date(2023, 2, 29), Some(date("2023-02-28")));
    }

    #[test]
    fn test_day_31_in_every_month() {
        let dates = yearly_due_dates(2023, 31);
        assert_eq!(dates.len(), 12);

        let expected_last_days = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (due, expected) in dates.iter().zip(expected_last_days) {
            assert_eq!(due.day(), expected, "wrong clamp for {}", due);
        }
    }

    #[test]
    fn test_plain_due_day_is_kept() {
        let dates = yearly_due_dates(2024, 10);
        assert!(dates.iter().all(|d| d.day() == 10 && d.year() == 2024));
        assert_eq!(dates[0], date("2024-01-10"));
        assert_eq!(dates[11], date("2024-12-10"));
    }

    #[test]
    fn test_plan_carries_current_tuition() {
        let student = Student::new("Ana".into(), "Marta".into(), 15000, 10);
        let charges = plan_year_charges(&student, 2024).unwrap();

        assert_eq!(charges.len(), 12);
        assert!(charges.iter().all(|c| c.amount_cents == 15000));
        assert!(charges.iter().all(|c| c.student_id == student.id));
    }

    #[test]
    fn test_plan_refuses_unconfigured_billing() {
        let free = Student::new("Ana".into(), "Marta".into(), 0, 10);
        assert_eq!(
            plan_year_charges(&free, 2024),
            Err(GenerationError::MissingTuition)
        );

        let mut bad_day = Student::new("Ana".into(), "Marta".into(), 15000, 10);
        bad_day.due_day = 0;
        assert_eq!(
            plan_year_charges(&bad_day, 2024),
            Err(GenerationError::InvalidDueDay(0))
        );
    }
}
