use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{GenerationError, ParseCentsError, StudentValidationError, UnknownPaymentMethod};

use super::{Action, Role};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Charge not found: {0}")]
    ChargeNotFound(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid due day: {0}")]
    InvalidDueDay(u32),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("{student} needs a monthly tuition and a due day before charges can be generated: {reason}")]
    BillingNotConfigured {
        student: String,
        reason: GenerationError,
    },

    #[error("{student} already has a charge due on {due_date}")]
    ChargeAlreadyExists { student: String, due_date: NaiveDate },

    #[error("Permission denied: {role} cannot {action}")]
    PermissionDenied { role: Role, action: Action },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<StudentValidationError> for AppError {
    fn from(err: StudentValidationError) -> Self {
        match err {
            StudentValidationError::MissingField(field) => AppError::MissingField(field),
            StudentValidationError::NegativeTuition(cents) => {
                AppError::InvalidAmount(format!("tuition cannot be negative ({} cents)", cents))
            }
            StudentValidationError::TuitionTooLarge(_) => {
                AppError::InvalidAmount("tuition cannot exceed 999999.99".to_string())
            }
            StudentValidationError::DueDayOutOfRange(day) => AppError::InvalidDueDay(day),
        }
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}

impl From<UnknownPaymentMethod> for AppError {
    fn from(err: UnknownPaymentMethod) -> Self {
        AppError::InvalidPaymentMethod(err.0)
    }
}
