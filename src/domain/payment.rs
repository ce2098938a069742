use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{sum_cents, Cents, ChargeId};

pub type PaymentId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Cash,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Pix, PaymentMethod::Cash, PaymentMethod::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "pix",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

/// A payment method name that is not pix, cash or card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method '{0}' (expected pix, cash or card)")]
pub struct UnknownPaymentMethod(pub String);

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    /// Accepts the English names as well as the Portuguese labels printed on
    /// the studio's receipts ("dinheiro", "cartao"/"cartão").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pix" => Ok(PaymentMethod::Pix),
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "card" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount received against a charge. Payments are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub charge_id: ChargeId,
    pub amount_cents: Cents,
    pub method: PaymentMethod,
    /// Calendar day the money was received
    pub paid_on: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        charge_id: ChargeId,
        amount_cents: Cents,
        method: PaymentMethod,
        paid_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            charge_id,
            amount_cents,
            method,
            paid_on,
            recorded_at: Utc::now(),
        }
    }
}

/// Totals partitioned by payment method. Every method is always present,
/// starting at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodTotals {
    pub pix: Cents,
    pub cash: Cents,
    pub card: Cents,
}

impl MethodTotals {
    pub fn add(&mut self, method: PaymentMethod, amount: Cents) {
        match method {
            PaymentMethod::Pix => self.pix = self.pix.saturating_add(amount),
            PaymentMethod::Cash => self.cash = self.cash.saturating_add(amount),
            PaymentMethod::Card => self.card = self.card.saturating_add(amount),
        }
    }

    pub fn get(&self, method: PaymentMethod) -> Cents {
        match method {
            PaymentMethod::Pix => self.pix,
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Card => self.card,
        }
    }

    pub fn total(&self) -> Cents {
        sum_cents([self.pix, self.cash, self.card])
    }
}

impl<'a> FromIterator<&'a Payment> for MethodTotals {
    fn from_iter<I: IntoIterator<Item = &'a Payment>>(iter: I) -> Self {
        let mut totals = MethodTotals::default();
        for payment in iter {
            totals.add(payment.method, payment.amount_cents);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_roundtrip() {
        for method in PaymentMethod::ALL {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(method, parsed);
        }
    }

    #[test]
    fn test_payment_method_portuguese_aliases() {
        assert_eq!("DINHEIRO".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert_eq!("Cartão".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
        assert_eq!(" PIX ".parse::<PaymentMethod>(), Ok(PaymentMethod::Pix));
        assert_eq!(
            "Boleto".parse::<PaymentMethod>(),
            Err(UnknownPaymentMethod("boleto".to_string()))
        );
    }

    #[test]
    fn test_method_totals_default_to_zero() {
        let totals = MethodTotals::default();
        for method in PaymentMethod::ALL {
            assert_eq!(totals.get(method), 0);
        }
        assert_eq!(totals.total(), 0);
    }

    #[test]
    fn test_method_totals_from_payments() {
        let charge = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let payments = vec![
            Payment::new(charge, 10000, PaymentMethod::Pix, day),
            Payment::new(charge, 2500, PaymentMethod::Pix, day),
            Payment::new(charge, 4000, PaymentMethod::Card, day),
        ];

        let totals: MethodTotals = payments.iter().collect();
        assert_eq!(totals.pix, 12500);
        assert_eq!(totals.cash, 0);
        assert_eq!(totals.card, 4000);
        assert_eq!(totals.total(), 16500);
    }
}
