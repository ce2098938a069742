mod common;

use anyhow::Result;
use common::{date, new_student, test_service, Enrollment};
use swimdesk::application::{AppError, MessagingConfig, NewStudent, Role, StudentUpdate};
use swimdesk::domain::{PaymentMethod, MAX_AMOUNT_CENTS};
use swimdesk::io::{write_cash_rows_csv, write_students_csv, DatabaseSnapshot, Exporter};

#[tokio::test]
async fn test_register_student_defaults() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let student = service
        .register_student(NewStudent {
            name: "  Ana Clara ".into(),
            guardian: "Marta".into(),
            phone: Some("  ".into()),
            ..Default::default()
        })
        .await?;

    assert_eq!(student.name, "Ana Clara");
    assert_eq!(student.due_day, 5);
    assert_eq!(student.tuition_cents, 0);
    assert!(student.active);
    assert!(!student.special_needs);
    assert_eq!(student.phone, None);

    let stored = service.get_student(student.id).await?;
    assert_eq!(stored, student);

    Ok(())
}

#[tokio::test]
async fn test_register_student_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let no_name = service
        .register_student(NewStudent {
            guardian: "Marta".into(),
            ..Default::default()
        })
        .await;
    assert!(matches!(no_name, Err(AppError::MissingField("name"))));

    let no_guardian = service
        .register_student(NewStudent {
            name: "Ana".into(),
            ..Default::default()
        })
        .await;
    assert!(matches!(no_guardian, Err(AppError::MissingField("guardian"))));

    let bad_day = service.register_student(new_student("Ana", 15000, 32)).await;
    assert!(matches!(bad_day, Err(AppError::InvalidDueDay(32))));

    let zero_day = service.register_student(new_student("Ana", 15000, 0)).await;
    assert!(matches!(zero_day, Err(AppError::InvalidDueDay(0))));

    let negative = service.register_student(new_student("Ana", -1, 10)).await;
    assert!(matches!(negative, Err(AppError::InvalidAmount(_))));

    let too_large = service
        .register_student(new_student("Ana", MAX_AMOUNT_CENTS + 1, 10))
        .await;
    assert!(matches!(too_large, Err(AppError::InvalidAmount(_))));

    assert!(service.list_students(None).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_update_student() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let student = service
        .register_student(NewStudent {
            phone: Some("11 98765-4321".into()),
            notes: Some("prefers mornings".into()),
            ..new_student("Ana", 15000, 10)
        })
        .await?;

    let updated = service
        .update_student(
            student.id,
            StudentUpdate {
                due_day: Some(20),
                active: Some(false),
                phone: Some(String::new()),
                special_needs: Some(true),
                special_needs_note: Some("ADHD".into()),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.tuition_cents, 15000);
    assert_eq!(updated.due_day, 20);
    assert!(!updated.active);
    assert_eq!(updated.phone, None);
    assert_eq!(updated.notes.as_deref(), Some("prefers mornings"));
    assert_eq!(updated.special_needs_note.as_deref(), Some("ADHD"));
    assert_eq!(service.get_student(student.id).await?, updated);

    let invalid = service
        .update_student(
            student.id,
            StudentUpdate {
                due_day: Some(40),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(invalid, Err(AppError::InvalidDueDay(40))));
    assert_eq!(service.get_student(student.id).await?.due_day, 20);

    let missing = service
        .update_student(uuid::Uuid::new_v4(), StudentUpdate::default())
        .await;
    assert!(matches!(missing, Err(AppError::StudentNotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_update_student_birth_date() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let student = service
        .register_student(new_student("Ana", 15000, 10))
        .await?;

    let born = service
        .update_student(
            student.id,
            StudentUpdate {
                birth_date: Some(Some(date("2015-06-15"))),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(born.birth_date, Some(date("2015-06-15")));

    let kept = service
        .update_student(
            student.id,
            StudentUpdate {
                due_day: Some(12),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(kept.birth_date, Some(date("2015-06-15")));

    let cleared = service
        .update_student(
            student.id,
            StudentUpdate {
                birth_date: Some(None),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(cleared.birth_date, None);
    assert_eq!(service.get_student(student.id).await?.birth_date, None);

    Ok(())
}

#[tokio::test]
async fn test_list_and_search_students() -> Result<()> {
    let (service, _temp) = test_service().await?;
    for name in ["joana", "Bruno", "Ana", "Mariana", "100% Swim"] {
        service.register_student(new_student(name, 15000, 10)).await?;
    }

    let names: Vec<_> = service
        .list_students(None)
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["100% Swim", "Ana", "Bruno", "joana", "Mariana"]);

    let found: Vec<_> = service
        .list_students(Some("ANA"))
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(found, vec!["Ana", "joana", "Mariana"]);

    // Wildcards are matched literally
    let percent = service.list_students(Some("%")).await?;
    assert_eq!(percent.len(), 1);

    // Blank search lists everyone
    assert_eq!(service.list_students(Some("  ")).await?.len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_message_links() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let student = service
        .register_student(NewStudent {
            phone: Some("(11) 98765-4321".into()),
            ..new_student("Ana", 15000, 10)
        })
        .await?;
    let charge = service
        .create_charge(student.id, None, date("2024-03-10"))
        .await?;
    let paid = service
        .record_payment(charge.id, 15000, PaymentMethod::Pix, date("2024-03-08"))
        .await?;

    let link = service.birthday_link(student.id).await?.unwrap();
    assert!(link.starts_with("https://wa.me/5511987654321?text="));
    assert!(!link.contains(' '));

    let reminder = service.due_reminder_message(charge.id).await?.unwrap();
    assert!(reminder.text.contains("10/03/2024"));
    assert!(reminder.text.contains("R$ 150.00"));
    assert!(service.due_reminder_link(charge.id).await?.is_some());

    let receipt = service.receipt_message(paid.payment.id).await?.unwrap();
    assert!(receipt.text.contains("03/2024"));
    assert!(receipt.text.contains("PIX"));
    assert!(receipt.text.contains("08/03/2024"));
    assert!(service.receipt_link(paid.payment.id).await?.is_some());

    let silent = service
        .register_student(new_student("Bruno", 15000, 10))
        .await?;
    assert_eq!(service.birthday_link(silent.id).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_messaging_config() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = service.with_messaging(MessagingConfig {
        country_code: "351".into(),
        studio_name: "Golfinho Swim".into(),
    });

    let student = service
        .register_student(NewStudent {
            phone: Some("912 345 678".into()),
            ..new_student("Ana", 15000, 10)
        })
        .await?;

    let message = service.birthday_message(student.id).await?.unwrap();
    assert_eq!(message.phone, "351912345678");
    assert!(message.text.contains("Golfinho Swim"));

    Ok(())
}

#[tokio::test]
async fn test_export_payments_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (_s, ana) = Enrollment::with_charge(&service, "Ana", 15000, date("2024-03-10")).await?;
    let (_s, bia) = Enrollment::with_charge(&service, "Bia", 15000, date("2024-03-10")).await?;

    service
        .record_payment(bia.id, 15000, PaymentMethod::Cash, date("2024-03-12"))
        .await?;
    service
        .record_payment(ana.id, 10050, PaymentMethod::Pix, date("2024-03-09"))
        .await?;
    service
        .record_payment(ana.id, 4950, PaymentMethod::Card, date("2024-04-01"))
        .await?;

    let exporter = Exporter::new(&service);

    let mut output = Vec::new();
    let count = exporter
        .export_payments_csv(&mut output, Role::Admin, None, None)
        .await?;
    assert_eq!(count, 3);

    let csv = String::from_utf8(output)?;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "student,amount,method,date",
            "Ana,100.50,pix,2024-03-09",
            "Bia,150.00,cash,2024-03-12",
            "Ana,49.50,card,2024-04-01",
        ]
    );

    let mut march = Vec::new();
    let count = exporter
        .export_payments_csv(
            &mut march,
            Role::Admin,
            Some(date("2024-03-01")),
            Some(date("2024-03-31")),
        )
        .await?;
    assert_eq!(count, 2);

    Ok(())
}

#[tokio::test]
async fn test_report_csv_quotes_names() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let (_s, silva) =
        Enrollment::with_charge(&service, "Silva, Ana", 15000, date("2024-03-10")).await?;
    let (_s, bia) = Enrollment::with_charge(&service, "Bia", 15000, date("2024-03-10")).await?;
    service
        .record_payment(silva.id, 15000, PaymentMethod::Pix, date("2024-03-09"))
        .await?;
    service
        .record_payment(bia.id, 5000, PaymentMethod::Cash, date("2024-03-12"))
        .await?;

    let expected = vec![
        "student,amount,method,date",
        "\"Silva, Ana\",150.00,pix,2024-03-09",
        "Bia,50.00,cash,2024-03-12",
    ];

    let mut exported = Vec::new();
    Exporter::new(&service)
        .export_payments_csv(&mut exported, Role::Admin, None, None)
        .await?;
    assert_eq!(String::from_utf8(exported)?.lines().collect::<Vec<_>>(), expected);

    // The cash report lists the newest payment first
    let cash = service.cash_report(Role::Admin, None, None).await?;
    let mut output = Vec::new();
    write_cash_rows_csv(&mut output, &cash.payments)?;
    assert_eq!(
        String::from_utf8(output)?.lines().collect::<Vec<_>>(),
        vec![expected[0], expected[2], expected[1]]
    );

    let closing = service.monthly_closing(Role::Admin, 2024, 3).await?;
    let mut output = Vec::new();
    write_cash_rows_csv(&mut output, &closing.payments)?;
    assert_eq!(String::from_utf8(output)?.lines().collect::<Vec<_>>(), expected);

    let students = service.list_students(None).await?;
    let mut output = Vec::new();
    write_students_csv(&mut output, &students)?;
    let roster = String::from_utf8(output)?;
    let lines: Vec<_> = roster.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "id,name,guardian,phone,tuition,due_day,active,special_needs"
    );
    assert!(lines[2].contains(",\"Silva, Ana\",\"Guardian of Silva, Ana\",,150.00,10,true,false"));

    Ok(())
}

#[tokio::test]
async fn test_export_full_json() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let student = service
        .register_student(new_student("Ana", 15000, 10))
        .await?;
    service.generate_year_charges(student.id, 2024).await?;
    let charge = service
        .create_charge(student.id, Some(3000), date("2024-07-01"))
        .await?;
    service
        .record_payment(charge.id, 3000, PaymentMethod::Pix, date("2024-07-01"))
        .await?;

    let exporter = Exporter::new(&service);
    let mut output = Vec::new();
    let snapshot = exporter.export_full_json(&mut output, Role::Admin).await?;

    assert_eq!(snapshot.students.len(), 1);
    assert_eq!(snapshot.charges.len(), 13);
    assert_eq!(snapshot.payments.len(), 1);

    let parsed: DatabaseSnapshot = serde_json::from_slice(&output)?;
    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(parsed.students[0].name, "Ana");
    assert_eq!(parsed.payments[0].method, PaymentMethod::Pix);

    Ok(())
}

#[tokio::test]
async fn test_database_reopens() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("studio.db");
    let path = db_path.to_str().unwrap();

    let student_id = {
        let service = swimdesk::StudioService::init(path).await?;
        service
            .register_student(new_student("Ana", 15000, 10))
            .await?
            .id
    };

    // Running init again on an existing database keeps its rows
    swimdesk::StudioService::init(path).await?;

    let service = swimdesk::StudioService::connect(path).await?;
    assert_eq!(service.get_student(student_id).await?.name, "Ana");

    Ok(())
}
