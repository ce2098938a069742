// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use swimdesk::application::{NewStudent, StudioService};
use swimdesk::domain::{Cents, Charge, PaymentMethod, Student};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(StudioService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = StudioService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a YYYY-MM-DD string
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Input for an active student with the given tuition and due day
pub fn new_student(name: &str, tuition_cents: Cents, due_day: u32) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        guardian: format!("Guardian of {}", name),
        tuition_cents,
        due_day: Some(due_day),
        ..Default::default()
    }
}

/// Test fixture: students with a single charge each
pub struct Enrollment;

impl Enrollment {
    /// Register a student and give them one charge due on `due_date`
    pub async fn with_charge(
        service: &StudioService,
        name: &str,
        amount_cents: Cents,
        due_date: NaiveDate,
    ) -> Result<(Student, Charge)> {
        let student = service
            .register_student(new_student(name, amount_cents, 10))
            .await?;
        let charge = service
            .create_charge(student.id, Some(amount_cents), due_date)
            .await?;
        Ok((student, charge))
    }

    /// Register a student, give them a charge and pay `paid_cents` on `paid_on`
    pub async fn paid(
        service: &StudioService,
        name: &str,
        amount_cents: Cents,
        due_date: NaiveDate,
        paid_cents: Cents,
        method: PaymentMethod,
        paid_on: NaiveDate,
    ) -> Result<(Student, Charge)> {
        let (student, charge) = Self::with_charge(service, name, amount_cents, due_date).await?;
        service
            .record_payment(charge.id, paid_cents, method, paid_on)
            .await?;
        Ok((student, charge))
    }
}
