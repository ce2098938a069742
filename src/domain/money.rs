use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// R$ 150,00 = 15000 cents.
pub type Cents = i64;

/// Largest amount a single tuition, charge or payment may carry: R$ 999.999,99.
pub const MAX_AMOUNT_CENTS: Cents = 99_999_999;

/// Sum amounts, saturating at `Cents::MAX` instead of overflowing.
pub fn sum_cents(amounts: impl IntoIterator<Item = Cents>) -> Cents {
    amounts.into_iter().fold(0, Cents::saturating_add)
}

/// Format cents as a plain decimal string with two fractional digits.
/// Example: 15000 -> "150.00", 5 -> "0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse an amount typed by an operator into cents.
///
/// Accepts both the Brazilian notation used at the front desk ("1.234,56",
/// "150,5") and dotted decimals ("1234.56", "150"). A leading "R$" is ignored.
/// When a comma is present it is the decimal separator and dots are
/// thousands separators. Digits beyond the second decimal place are truncated.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let input = input.strip_prefix("R$").unwrap_or(input).trim();

    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }
    if input.starts_with('-') {
        return Err(ParseCentsError::Negative);
    }

    let normalized = if input.contains(',') {
        input.replace('.', "").replace(',', ".")
    } else {
        input.to_string()
    };

    let parts: Vec<&str> = normalized.split('.').collect();
    let (units_str, decimal_str) = match parts.as_slice() {
        [units] => (*units, ""),
        [units, decimals] => (*units, *decimals),
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
        || (units_str.is_empty() && decimal_str.is_empty())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        // Only digits remain, so the sole failure is overflow
        units_str.parse().map_err(|_| ParseCentsError::TooLarge)?
    };

    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        // "5" after the separator means 50 cents
        1 => decimal_str[..1].parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::TooLarge)?;
    if cents > MAX_AMOUNT_CENTS {
        return Err(ParseCentsError::TooLarge);
    }
    Ok(cents)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,
    #[error("amount cannot be negative")]
    Negative,
    #[error("invalid money format (use 150,00 or 150.00)")]
    InvalidFormat,
    #[error("amount cannot exceed 999999.99")]
    TooLarge,
}
