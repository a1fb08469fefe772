//! Payment model
//!
//! Payments received from clients. A credit-card payment carries a VAT
//! liability: the payment service creates a linked Expense for it, and the
//! pair must be undone or restored together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ClientId, PaymentId, ServiceId};
use super::money::Money;

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment
    #[default]
    Cash,
    /// Credit card payment (generates a VAT expense)
    CreditCard,
    /// Bank transfer
    BankTransfer,
}

impl PaymentMethod {
    /// Parse a payment method from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "card" | "credit" | "credit_card" | "credit-card" => Some(Self::CreditCard),
            "transfer" | "bank" | "bank_transfer" | "bank-transfer" => Some(Self::BankTransfer),
            _ => None,
        }
    }

    /// Whether this method incurs the VAT side-ledger entry
    pub fn incurs_vat(&self) -> bool {
        matches!(self, Self::CreditCard)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::CreditCard => write!(f, "Credit Card"),
            Self::BankTransfer => write!(f, "Bank Transfer"),
        }
    }
}

/// A payment received from a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,

    /// The paying client
    pub client_id: ClientId,

    /// The package this payment is for, if any
    pub service_id: Option<ServiceId>,

    /// Amount received
    pub amount: Money,

    /// Payment method
    #[serde(default)]
    pub method: PaymentMethod,

    /// Payment date
    pub date: NaiveDate,

    /// Free-text note
    #[serde(default)]
    pub note: String,

    /// When the payment row was created
    pub created_at: DateTime<Utc>,

    /// When the payment row was last modified
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Create a new payment
    pub fn new(client_id: ClientId, amount: Money, method: PaymentMethod, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            client_id,
            service_id: None,
            amount,
            method,
            date,
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the payment's fields
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_positive() {
            return Err("Payment amount must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::CreditCard));
        assert_eq!(
            PaymentMethod::parse("transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }

    #[test]
    fn test_incurs_vat() {
        assert!(PaymentMethod::CreditCard.incurs_vat());
        assert!(!PaymentMethod::Cash.incurs_vat());
        assert!(!PaymentMethod::BankTransfer.incurs_vat());
    }

    #[test]
    fn test_zero_amount_invalid() {
        let payment = Payment::new(
            ClientId::new(),
            Money::zero(),
            PaymentMethod::Cash,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        assert!(payment.validate().is_err());
    }
}
