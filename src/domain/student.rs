use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, MAX_AMOUNT_CENTS};

pub type StudentId = Uuid;

/// Due day used when registering a student without one.
pub const DEFAULT_DUE_DAY: u32 = 5;

/// A student enrolled at the studio, together with the billing configuration
/// the charge generator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Parent or guardian responsible for payments
    pub guardian: String,
    /// Guardian's phone as typed (area code + number); normalized only when
    /// building messaging links
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Monthly tuition in cents (never negative)
    pub tuition_cents: Cents,
    /// Day of the month charges fall due (1-31, clamped per month)
    pub due_day: u32,
    pub active: bool,
    pub special_needs: bool,
    /// Free-text description of the condition when `special_needs` is set
    pub special_needs_note: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn new(name: String, guardian: String, tuition_cents: Cents, due_day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            guardian,
            phone: None,
            birth_date: None,
            tuition_cents,
            due_day,
            active: true,
            special_needs: false,
            special_needs_note: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Check the invariants a student record must hold before it is saved.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::MissingField("name"));
        }
        if self.guardian.trim().is_empty() {
            return Err(StudentValidationError::MissingField("guardian"));
        }
        if self.tuition_cents < 0 {
            return Err(StudentValidationError::NegativeTuition(self.tuition_cents));
        }
        if self.tuition_cents > MAX_AMOUNT_CENTS {
            return Err(StudentValidationError::TuitionTooLarge(self.tuition_cents));
        }
        validate_due_day(self.due_day)
    }
}

pub fn validate_due_day(day: u32) -> Result<(), StudentValidationError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(StudentValidationError::DueDayOutOfRange(day))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("tuition cannot be negative ({0} cents)")]
    NegativeTuition(Cents),
    #[error("tuition cannot exceed 999999.99 ({0} cents)")]
    TuitionTooLarge(Cents),
    #[error("due day must be between 1 and 31, got {0}")]
    DueDayOutOfRange(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_student_defaults() {
        let student = Student::new("Ana".into(), "Marta".into(), 15000, 10);
        assert!(student.active);
        assert!(!student.special_needs);
        assert!(student.phone.is_none());
        assert!(student.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let blank = Student::new("  ".into(), "Marta".into(), 0, 5);
        assert_eq!(
            blank.validate(),
            Err(StudentValidationError::MissingField("name"))
        );

        let negative = Student::new("Ana".into(), "Marta".into(), -1, 5);
        assert!(matches!(
            negative.validate(),
            Err(StudentValidationError::NegativeTuition(-1))
        ));

        let huge = Student::new("Ana".into(), "Marta".into(), MAX_AMOUNT_CENTS + 1, 5);
        assert!(matches!(
            huge.validate(),
            Err(StudentValidationError::TuitionTooLarge(_))
        ));
        let top = Student::new("Ana".into(), "Marta".into(), MAX_AMOUNT_CENTS, 5);
        assert!(top.validate().is_ok());

        let late = Student::new("Ana".into(), "Marta".into(), 100, 32);
        assert_eq!(
            late.validate(),
            Err(StudentValidationError::DueDayOutOfRange(32))
        );
        assert!(validate_due_day(0).is_err());
        assert!(validate_due_day(31).is_ok());
    }
}
