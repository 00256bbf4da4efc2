//! Billing arithmetic: totals, tax and outstanding balances.
//!
//! These are pure functions over plain amounts so they can be used both for the live preview
//! while an intake form is being filled in and for the figures recorded at pickup and printed
//! on the receipt.
//!
//! # Example
//!
//! ```
//! use jobcard::billing;
//!
//! assert_eq!(billing::total(400.0, 10.0), 440.0);
//! assert_eq!(billing::balance(400.0, 10.0, 200.0), 240.0);
//! assert_eq!(billing::balance(400.0, 10.0, 500.0), 0.0);
//! ```
use serde::{Deserialize, Serialize};

use crate::job::{form::JobForm, Estimate};

/// Parses user entered text as a non-negative amount.
///
/// Blank, non-numeric, non-finite and negative input all become `0`.
pub fn coerce_amount(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) => non_negative(value),
        Err(_) => 0.0,
    }
}

/// The estimate including tax: `amount + amount * tax_percent / 100`.
pub fn total(amount: f64, tax_percent: f64) -> f64 {
    non_negative(amount + tax_amount(amount, tax_percent))
}

/// The tax due on `amount` at `tax_percent` percent.
pub fn tax_amount(amount: f64, tax_percent: f64) -> f64 {
    amount * tax_percent / 100.0
}

/// What remains to be collected on the estimate once the advance is taken into account.
pub fn balance(amount: f64, tax_percent: f64, advance: f64) -> f64 {
    non_negative(total(amount, tax_percent) - advance)
}

/// What remains to be collected at pickup given the agreed final amount.
pub fn settle(final_amount: f64, advance: f64) -> f64 {
    non_negative(final_amount - advance)
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// The figures shown on a receipt or in a form preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub subtotal: f64,
    pub tax_percent: f64,
    pub tax: f64,
    pub grand_total: f64,
    pub advance: f64,
    pub balance: f64,
}

impl Breakdown {
    pub fn new(amount: f64, tax_percent: f64, advance: f64) -> Self {
        Self {
            subtotal: amount,
            tax_percent,
            tax: tax_amount(amount, tax_percent),
            grand_total: total(amount, tax_percent),
            advance,
            balance: balance(amount, tax_percent, advance),
        }
    }

    pub fn from_estimate(estimate: &Estimate) -> Self {
        Self::new(estimate.amount, estimate.tax_percent, estimate.advance)
    }

    /// Coerces the raw form fields and computes the breakdown they would produce.
    pub fn from_form(form: &JobForm) -> Self {
        Self::from_estimate(&form.estimate())
    }
}

/// Renders amounts with a fixed currency symbol and two decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    symbol: String,
}

impl Currency {
    pub const DEFAULT_SYMBOL: &'static str = "₹";

    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Formats `amount`, rendering anything that is not a finite number as zero.
    pub fn format(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        format!("{}{amount:.2}", self.symbol)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SYMBOL)
    }
}
