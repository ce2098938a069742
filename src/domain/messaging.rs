use super::{format_cents, Charge, Payment, Student};

pub const DEFAULT_COUNTRY_CODE: &str = "55";

/// Strip everything but digits and prefix the country code when missing.
/// Returns `None` when no digits remain.
pub fn normalize_phone(raw: &str, country_code: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.starts_with(country_code) {
        Some(digits)
    } else {
        Some(format!("{}{}", country_code, digits))
    }
}

/// Click-to-chat deep link for the given phone and message.
pub fn chat_link(phone: &str, text: &str) -> String {
    format!("https://wa.me/{}?text={}", phone, urlencoding::encode(text))
}

/// A message ready to be sent to a student's guardian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub phone: String,
    pub text: String,
}

impl OutgoingMessage {
    /// Pair `text` with the student's normalized phone, if it has one.
    pub fn for_student(student: &Student, country_code: &str, text: String) -> Option<Self> {
        let phone = normalize_phone(student.phone.as_deref()?, country_code)?;
        Some(Self { phone, text })
    }

    pub fn link(&self) -> String {
        chat_link(&self.phone, &self.text)
    }
}

pub fn birthday_text(student: &Student, studio_name: &str) -> String {
    format!(
        "Hi {}!\n\nEveryone at {} wishes you a very happy birthday!\n\n\
         Lots of health and great swimming this year!",
        student.name, studio_name
    )
}

pub fn due_reminder_text(student: &Student, charge: &Charge) -> String {
    format!(
        "Hello!\n\nThe swimming tuition for {} is due on {}.\n\n\
         Amount: R$ {}\n\nIf you have already paid, please disregard this message.",
        student.name,
        charge.due_date.format("%d/%m/%Y"),
        format_cents(charge.amount_cents)
    )
}

pub fn receipt_text(student: &Student, charge: &Charge, payment: &Payment) -> String {
    format!(
        "PAYMENT RECEIPT\n\nStudent: {}\nAmount: R$ {}\nReference: {}\n\
         Method: {}\nDate: {}\n\nThank you!",
        student.name,
        format_cents(payment.amount_cents),
        charge.period_label(),
        payment.method.as_str().to_uppercase(),
        payment.paid_on.format("%d/%m/%Y")
    )
}
