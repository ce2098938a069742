use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{
    AppError, MessagingConfig, NewStudent, Role, StudentUpdate, StudioService,
};
use crate::domain::{format_cents, parse_cents, PaymentMethod, Student};
use crate::io::{write_cash_rows_csv, write_students_csv};

/// Swimdesk - tuition and payment ledger for a small swim studio
#[derive(Parser)]
#[command(name = "swimdesk")]
#[command(about = "Track students, monthly tuition charges and payments at a swim studio")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SWIMDESK_DB", default_value = "swimdesk.db", global = true)]
    pub database: String,

    /// Role of the operator: admin or front-desk
    #[arg(long, env = "SWIMDESK_ROLE", default_value = "admin", global = true)]
    pub role: Role,

    /// Country code prefixed to phone numbers in message links
    #[arg(long, env = "SWIMDESK_COUNTRY_CODE", default_value = "55", global = true)]
    pub country_code: String,

    /// Studio name used in greetings
    #[arg(long, env = "SWIMDESK_STUDIO_NAME", default_value = "the studio", global = true)]
    pub studio_name: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Student management commands
    #[command(subcommand)]
    Student(StudentCommands),

    /// Tuition charge commands
    #[command(subcommand)]
    Charge(ChargeCommands),

    /// Record a payment against a charge
    Pay {
        /// Charge ID
        charge: String,

        /// Amount received (e.g., "150,00", "1.234,56" or "150.00")
        amount: String,

        /// Payment method: pix, cash, card
        #[arg(short, long, default_value = "pix")]
        method: String,

        /// Date the payment was received (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Financial reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: payments (CSV), full (JSON)
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Start date for payments (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date for payments, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Build click-to-chat links for guardians
    #[command(subcommand)]
    Message(MessageCommands),
}

#[derive(Subcommand)]
pub enum StudentCommands {
    /// Register a new student
    Add {
        /// Student name
        name: String,

        /// Parent or guardian name
        #[arg(short, long)]
        guardian: String,

        /// Guardian phone with area code
        #[arg(short, long)]
        phone: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,

        /// Monthly tuition (e.g., "150,00")
        #[arg(short, long)]
        tuition: Option<String>,

        /// Day of the month tuition falls due (1-31)
        #[arg(long)]
        due_day: Option<u32>,

        /// Student has special needs
        #[arg(long)]
        special_needs: bool,

        /// Description of the special needs
        #[arg(long)]
        special_needs_note: Option<String>,

        /// Free-text observations
        #[arg(short, long)]
        notes: Option<String>,

        /// Register the student as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a student (only the given fields change; "" clears a text field)
    Edit {
        /// Student ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        guardian: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,

        #[arg(long)]
        birth_date: Option<String>,

        /// Remove the stored birth date
        #[arg(long, conflicts_with = "birth_date")]
        clear_birth_date: bool,

        #[arg(short, long)]
        tuition: Option<String>,

        #[arg(long)]
        due_day: Option<u32>,

        /// Set the active flag (true/false)
        #[arg(long)]
        active: Option<bool>,

        /// Set the special-needs flag (true/false)
        #[arg(long)]
        special_needs: Option<bool>,

        #[arg(long)]
        special_needs_note: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List students
    List {
        /// Filter by name
        search: Option<String>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show a student's account statement
    Show {
        /// Student ID
        id: String,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Delete a student with all charges and payments
    Delete {
        /// Student ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ChargeCommands {
    /// Create a single charge
    Add {
        /// Student ID
        student: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        /// Amount (defaults to the student's tuition)
        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Generate the monthly charges of a year
    Generate {
        /// Student ID
        student: String,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show a charge with its payments
    Show {
        /// Charge ID
        id: String,
    },

    /// Delete a charge and its payments
    Delete {
        /// Charge ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Today's figures, overdue amounts and recent revenue
    Dashboard {
        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Payments received in a date range
    Cash {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Payments of one calendar month
    Closing {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Revenue for each month of a year
    Revenue {
        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Students whose birthday is today
    Birthdays {
        /// Only active students
        #[arg(long)]
        active_only: bool,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum MessageCommands {
    /// Birthday greeting for a student
    Birthday {
        /// Student ID
        student: String,
    },

    /// Due date reminder for a charge
    Reminder {
        /// Charge ID
        charge: String,
    },

    /// Receipt for a payment
    Receipt {
        /// Payment ID
        payment: String,
    },
}

impl Cli {
    async fn service(&self) -> Result<StudioService> {
        let service = StudioService::connect(&self.database)
            .await
            .with_context(|| format!("Failed to open database: {}", self.database))?;
        Ok(service.with_messaging(MessagingConfig {
            country_code: self.country_code.clone(),
            studio_name: self.studio_name.clone(),
        }))
    }

    pub async fn run(self) -> Result<()> {
        let today = Local::now().date_naive();
        let role = self.role;

        if matches!(self.command, Commands::Init) {
            StudioService::init(&self.database).await?;
            println!("Database initialized: {}", self.database);
            return Ok(());
        }

        let service = self.service().await?;

        match self.command {
            Commands::Init => {}

            Commands::Student(cmd) => run_student_command(&service, cmd, role, today).await?,

            Commands::Charge(cmd) => run_charge_command(&service, cmd, role, today).await?,

            Commands::Pay {
                charge,
                amount,
                method,
                date,
            } => {
                let charge_id = parse_id(&charge, "charge")?;
                let amount_cents = parse_cents(&amount)
                    .context("Invalid amount format. Use '150,00' or '150.00'")?;
                let method: PaymentMethod = method.parse().map_err(AppError::from)?;
                let paid_on = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => today,
                };

                let result = service
                    .record_payment(charge_id, amount_cents, method, paid_on)
                    .await?;

                println!(
                    "Recorded payment: {} {} from {} ({})",
                    format_cents(result.payment.amount_cents),
                    result.payment.method.as_str().to_uppercase(),
                    result.student_name,
                    result.payment.id
                );
                println!("Open balance: {}", format_cents(result.open_balance));
            }

            Commands::Report(cmd) => run_report_command(&service, cmd, role, today).await?,

            Commands::Export {
                export_type,
                output,
                from,
                to,
            } => {
                run_export_command(&service, role, &export_type, output.as_deref(), from, to)
                    .await?
            }

            Commands::Message(cmd) => run_message_command(&service, cmd).await?,
        }

        Ok(())
    }
}

async fn run_student_command(
    service: &StudioService,
    cmd: StudentCommands,
    role: Role,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        StudentCommands::Add {
            name,
            guardian,
            phone,
            birth_date,
            tuition,
            due_day,
            special_needs,
            special_needs_note,
            notes,
            inactive,
        } => {
            let tuition_cents = tuition
                .map(|t| parse_cents(&t))
                .transpose()
                .context("Invalid tuition format. Use '150,00' or '150.00'")?
                .unwrap_or(0);

            let student = service
                .register_student(NewStudent {
                    name,
                    guardian,
                    phone,
                    birth_date: birth_date.as_deref().map(parse_date).transpose()?,
                    tuition_cents,
                    due_day,
                    inactive,
                    special_needs,
                    special_needs_note,
                    notes,
                })
                .await?;

            println!("Registered student: {} ({})", student.name, student.id);
            println!(
                "  Tuition: {} due on day {}",
                format_cents(student.tuition_cents),
                student.due_day
            );
        }

        StudentCommands::Edit {
            id,
            name,
            guardian,
            phone,
            birth_date,
            clear_birth_date,
            tuition,
            due_day,
            active,
            special_needs,
            special_needs_note,
            notes,
        } => {
            let student_id = parse_id(&id, "student")?;
            let update = StudentUpdate {
                name,
                guardian,
                phone,
                birth_date: if clear_birth_date {
                    Some(None)
                } else {
                    birth_date.as_deref().map(parse_date).transpose()?.map(Some)
                },
                tuition_cents: tuition
                    .map(|t| parse_cents(&t))
                    .transpose()
                    .context("Invalid tuition format")?,
                due_day,
                active,
                special_needs,
                special_needs_note,
                notes,
            };

            let student = service.update_student(student_id, update).await?;
            println!("Updated student: {} ({})", student.name, student.id);
        }

        StudentCommands::List { search, format } => {
            let students = service.list_students(search.as_deref()).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&students)?),
                "csv" => write_students_csv(std::io::stdout().lock(), &students)?,
                _ => print_students(&students),
            }
        }

        StudentCommands::Show { id, format } => {
            let student_id = parse_id(&id, "student")?;
            let statement = service.student_statement(student_id, today).await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&statement)?);
                return Ok(());
            }

            let s = &statement.student;
            println!("Student:   {}", s.name);
            println!("ID:        {}", s.id);
            println!("Guardian:  {}", s.guardian);
            if let Some(phone) = &s.phone {
                println!("Phone:     {}", phone);
            }
            if let Some(birth) = s.birth_date {
                println!("Born:      {}", birth.format("%d/%m/%Y"));
            }
            println!(
                "Tuition:   {} due on day {}",
                format_cents(s.tuition_cents),
                s.due_day
            );
            println!("Status:    {}", if s.active { "active" } else { "inactive" });
            if s.special_needs {
                println!(
                    "Special needs: {}",
                    s.special_needs_note.as_deref().unwrap_or("yes")
                );
            }
            if let Some(notes) = &s.notes {
                println!("Notes:     {}", notes);
            }
            println!();

            if statement.charges.is_empty() {
                println!("No charges.");
                return Ok(());
            }

            println!(
                "{:<36}  {:<10} {:>10} {:>10} {:>10} {:>5}  {}",
                "CHARGE", "DUE", "AMOUNT", "PAID", "OPEN", "PAYS", "STATUS"
            );
            println!("{}", "-".repeat(100));
            for status in &statement.charges {
                let label = if status.open_balance == 0 {
                    "paid"
                } else if status.overdue {
                    "overdue"
                } else {
                    "open"
                };
                println!(
                    "{:<36}  {:<10} {:>10} {:>10} {:>10} {:>5}  {}",
                    status.charge.id,
                    status.charge.due_date.format("%Y-%m-%d"),
                    format_cents(status.charge.amount_cents),
                    format_cents(status.paid),
                    format_cents(status.open_balance),
                    status.payments.len(),
                    label
                );
            }
            println!("{}", "-".repeat(100));
            println!("Total open:    {:>12}", format_cents(statement.total_open));
            println!("Total overdue: {:>12}", format_cents(statement.total_overdue));
        }

        StudentCommands::Delete { id } => {
            let student_id = parse_id(&id, "student")?;
            let student = service.delete_student(role, student_id).await?;
            println!("Deleted student: {} ({})", student.name, student.id);
        }
    }

    Ok(())
}

async fn run_charge_command(
    service: &StudioService,
    cmd: ChargeCommands,
    role: Role,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ChargeCommands::Add {
            student,
            due,
            amount,
        } => {
            let student_id = parse_id(&student, "student")?;
            let due_date = parse_date(&due)?;
            let amount_cents = amount
                .map(|a| parse_cents(&a))
                .transpose()
                .context("Invalid amount format")?;

            let charge = service
                .create_charge(student_id, amount_cents, due_date)
                .await?;
            println!(
                "Created charge: {} due {} ({})",
                format_cents(charge.amount_cents),
                charge.due_date.format("%Y-%m-%d"),
                charge.id
            );
        }

        ChargeCommands::Generate { student, year } => {
            let student_id = parse_id(&student, "student")?;
            let year = year.unwrap_or_else(|| today.year());
            let result = service.generate_year_charges(student_id, year).await?;

            println!(
                "Generated charges for {}: {} created, {} already existed",
                result.year, result.created, result.skipped
            );
        }

        ChargeCommands::Show { id } => {
            let charge_id = parse_id(&id, "charge")?;
            let charge = service.get_charge(charge_id).await?;
            let student = service.get_student(charge.student_id).await?;
            let payments = service.list_payments_for_charge(charge_id).await?;
            let open = service.charge_balance(charge_id).await?;

            println!("Charge:    {}", charge.id);
            println!("Student:   {}", student.name);
            println!("Reference: {}", charge.period_label());
            println!("Due:       {}", charge.due_date.format("%Y-%m-%d"));
            println!("Amount:    {}", format_cents(charge.amount_cents));
            println!("Open:      {}", format_cents(open));
            if charge.is_overdue(today) && open > 0 {
                println!("Status:    overdue");
            }

            if !payments.is_empty() {
                println!();
                println!("{:<36}  {:<10} {:>10}  {}", "PAYMENT", "DATE", "AMOUNT", "METHOD");
                println!("{}", "-".repeat(68));
                for p in &payments {
                    println!(
                        "{:<36}  {:<10} {:>10}  {}",
                        p.id,
                        p.paid_on.format("%Y-%m-%d"),
                        format_cents(p.amount_cents),
                        p.method
                    );
                }
            }
        }

        ChargeCommands::Delete { id } => {
            let charge_id = parse_id(&id, "charge")?;
            let charge = service.delete_charge(role, charge_id).await?;
            println!(
                "Deleted charge due {} ({})",
                charge.due_date.format("%Y-%m-%d"),
                charge.id
            );
        }
    }

    Ok(())
}

async fn run_report_command(
    service: &StudioService,
    cmd: ReportCommands,
    role: Role,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        ReportCommands::Dashboard { format } => {
            let report = service.dashboard(role, today).await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Dashboard for {}", report.as_of.format("%d/%m/%Y"));
            println!();
            println!("Received today:      {:>12}", format_cents(report.received_today));
            for method in PaymentMethod::ALL {
                println!(
                    "  {:<18} {:>12}",
                    method.as_str().to_uppercase(),
                    format_cents(report.today_by_method.get(method))
                );
            }
            println!("Received this month: {:>12}", format_cents(report.received_this_month));
            println!("Received this year:  {:>12}", format_cents(report.received_this_year));
            println!();
            println!("Overdue total:       {:>12}", format_cents(report.overdue_total));
            println!("Delinquent students: {:>12}", report.delinquent_students);
            println!("Special needs:       {:>12}", report.special_needs_students);

            if !report.birthdays.is_empty() {
                println!();
                println!("Birthdays today:");
                for s in &report.birthdays {
                    println!("  {}", s.name);
                }
            }

            println!();
            println!("Revenue, last {} months:", report.revenue_chart.len());
            for point in &report.revenue_chart {
                println!("  {:<10} {:>12}", point.label, format_cents(point.total));
            }
        }

        ReportCommands::Cash { from, to, format } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let report = service.cash_report(role, from, to).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => write_cash_rows_csv(std::io::stdout().lock(), &report.payments)?,
                _ => {
                    println!("Cash Report");
                    println!("Period: {}", range_label(from, to));
                    println!();
                    print_cash_rows(&report.payments);
                    println!();
                    for method in PaymentMethod::ALL {
                        println!(
                            "{:<8} {:>12}",
                            method.as_str().to_uppercase(),
                            format_cents(report.by_method.get(method))
                        );
                    }
                    println!("{:<8} {:>12}", "TOTAL", format_cents(report.total));
                }
            }
        }

        ReportCommands::Closing {
            year,
            month,
            format,
        } => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let closing = service.monthly_closing(role, year, month).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&closing)?),
                "csv" => write_cash_rows_csv(std::io::stdout().lock(), &closing.payments)?,
                _ => {
                    println!("Monthly Closing {:02}/{}", closing.month, closing.year);
                    println!();
                    print_cash_rows(&closing.payments);
                    println!();
                    println!("{:<8} {:>12}", "TOTAL", format_cents(closing.total));
                }
            }
        }

        ReportCommands::Revenue { year, format } => {
            let year = year.unwrap_or_else(|| today.year());
            let series = service.revenue_series(role, year).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&series)?),
                "csv" => {
                    println!("month,total");
                    for (i, total) in series.months.iter().enumerate() {
                        println!("{},{}", i + 1, format_cents(*total));
                    }
                }
                _ => {
                    println!("Revenue {}", series.year);
                    println!();
                    println!("{:<8} {:>12}", "MONTH", "TOTAL");
                    println!("{}", "-".repeat(21));
                    for (i, total) in series.months.iter().enumerate() {
                        println!("{:<8} {:>12}", MONTH_NAMES[i], format_cents(*total));
                    }
                    println!("{}", "-".repeat(21));
                    println!("{:<8} {:>12}", "TOTAL", format_cents(series.total));
                }
            }
        }

        ReportCommands::Birthdays {
            active_only,
            format,
        } => {
            let students = service.birthdays(today, active_only).await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&students)?);
            } else if students.is_empty() {
                println!("No birthdays today.");
            } else {
                print_students(&students);
            }
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &StudioService,
    role: Role,
    export_type: &str,
    output: Option<&str>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "payments" => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            let count = exporter.export_payments_csv(writer, role, from, to).await?;
            if output.is_some() {
                eprintln!("Exported {} payments", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer, role).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} students, {} charges, {} payments",
                    snapshot.students.len(),
                    snapshot.charges.len(),
                    snapshot.payments.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: payments, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_message_command(service: &StudioService, cmd: MessageCommands) -> Result<()> {
    let message = match cmd {
        MessageCommands::Birthday { student } => {
            service
                .birthday_message(parse_id(&student, "student")?)
                .await?
        }
        MessageCommands::Reminder { charge } => {
            service
                .due_reminder_message(parse_id(&charge, "charge")?)
                .await?
        }
        MessageCommands::Receipt { payment } => {
            service
                .receipt_message(parse_id(&payment, "payment")?)
                .await?
        }
    };

    match message {
        Some(message) => {
            println!("{}", message.text);
            println!();
            println!("{}", message.link());
        }
        None => println!("Student has no phone number on file."),
    }

    Ok(())
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn print_students(students: &[Student]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    println!(
        "{:<36}  {:<24} {:<20} {:>10} {:>4}  {}",
        "ID", "NAME", "GUARDIAN", "TUITION", "DUE", "FLAGS"
    );
    println!("{}", "-".repeat(106));

    for s in students {
        let mut flags = Vec::new();
        if !s.active {
            flags.push("inactive");
        }
        if s.special_needs {
            flags.push("special-needs");
        }
        println!(
            "{:<36}  {:<24} {:<20} {:>10} {:>4}  {}",
            s.id,
            truncate(&s.name, 24),
            truncate(&s.guardian, 20),
            format_cents(s.tuition_cents),
            s.due_day,
            flags.join(",")
        );
    }
}

fn print_cash_rows(rows: &[crate::application::CashRow]) {
    if rows.is_empty() {
        println!("No payments.");
        return;
    }

    println!("{:<10}  {:<28} {:>12}  {}", "DATE", "STUDENT", "AMOUNT", "METHOD");
    println!("{}", "-".repeat(62));
    for row in rows {
        println!(
            "{:<10}  {:<28} {:>12}  {}",
            row.date.format("%Y-%m-%d"),
            truncate(&row.student_name, 28),
            format_cents(row.amount),
            row.method.as_str().to_uppercase()
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Open ends of a cash report range read "start" and "end". A missing end
/// date also covers payments dated after today.
fn range_label(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    let show = |d: Option<NaiveDate>, open: &str| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| open.to_string())
    };
    format!("{} to {}", show(from, "start"), show(to, "end"))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD", date_str))
}

fn parse_id(id: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(id).with_context(|| format!("Invalid {} ID format (expected UUID)", what))
}
