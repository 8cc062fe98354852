//! # GST Invoice Calculator
//!
//! Derives invoice totals from a base amount, a discount, a GST rate and the
//! amount already paid.
//!
//! ## Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount ──► apply discount ──► discounted_amount (= total_without_gst)  │
//! │                                      │                                  │
//! │                                      ├──► × rate% ──► gst_amount        │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                       total_with_gst = discounted + gst                 │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                  remaining_amount = total_with_gst - paid               │
//! │                                                                         │
//! │  Example: 1000, 10% off, 18% GST, 500 paid                              │
//! │    discounted 900 → gst 162 → total 1062 → remaining 562                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator works on plain `f64` and never rounds; rounding for display
//! happens in [`round_currency`] or in the client's formatter. No bounds are
//! enforced: discounts over 100% and overpayment simply produce negative
//! numbers, and a negative `remaining_amount` is how overpayment shows up.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::entity::Invoice;
use crate::error::ValidationError;
use crate::validation::validate_percentage;

// =============================================================================
// Breakdown
// =============================================================================

/// Inputs to the calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstInput {
    pub amount: f64,
    pub discount_pct: f64,
    pub gst_rate_pct: f64,
    pub paid_amount: f64,
}

/// Derived invoice totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstBreakdown {
    pub discounted_amount: f64,
    pub gst_amount: f64,
    pub total_without_gst: f64,
    pub total_with_gst: f64,
    pub remaining_amount: f64,
}

/// Computes the invoice totals.
///
/// ## Example
/// ```rust
/// use crmdesk_core::gst::calculate_gst;
///
/// let totals = calculate_gst(1000.0, 10.0, 18.0, 500.0);
/// assert_eq!(totals.discounted_amount, 900.0);
/// assert_eq!(totals.gst_amount, 162.0);
/// assert_eq!(totals.total_with_gst, 1062.0);
/// assert_eq!(totals.remaining_amount, 562.0);
/// ```
pub fn calculate_gst(
    amount: f64,
    discount_pct: f64,
    gst_rate_pct: f64,
    paid_amount: f64,
) -> GstBreakdown {
    let discounted_amount = amount * (1.0 - discount_pct / 100.0);
    let gst_amount = discounted_amount * (gst_rate_pct / 100.0);
    let total_with_gst = discounted_amount + gst_amount;

    GstBreakdown {
        discounted_amount,
        gst_amount,
        total_without_gst: discounted_amount,
        total_with_gst,
        remaining_amount: total_with_gst - paid_amount,
    }
}

impl GstInput {
    /// Runs [`calculate_gst`] on these inputs.
    pub fn breakdown(&self) -> GstBreakdown {
        calculate_gst(
            self.amount,
            self.discount_pct,
            self.gst_rate_pct,
            self.paid_amount,
        )
    }
}

/// Rounds half away from zero to `decimals` places. Display only.
///
/// ```rust
/// use crmdesk_core::gst::round_currency;
///
/// assert_eq!(round_currency(162.005, 2), 162.01);
/// assert_eq!(round_currency(-0.125, 2), -0.13);
/// ```
pub fn round_currency(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    // Nudge by a relative epsilon so binary representations like 162.00499.. round up
    let nudged = value * factor * (1.0 + f64::EPSILON);
    nudged.round() / factor
}

// =============================================================================
// Invoice Form
// =============================================================================

/// In-progress invoice dialog state.
///
/// The four inputs have setters; each setter recomputes the derived totals
/// immediately. Derived totals are read-only.
///
/// ## User Workflow
/// ```text
/// User edits "Discount %" ──► set_discount_pct(10)
///                                  │
///                                  ▼
///                       recompute() ← every setter
///                                  │
///                                  ▼
///        breakdown() → totals shown, "Remaining" field read-only
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    input: GstInput,
    breakdown: GstBreakdown,
}

impl InvoiceForm {
    /// Blank form, all zero.
    pub fn new() -> Self {
        InvoiceForm::default()
    }

    /// Seeds the form from an existing invoice (edit dialog).
    pub fn from_invoice(invoice: &Invoice) -> Self {
        InvoiceForm::from_input(GstInput {
            amount: invoice.amount,
            discount_pct: invoice.discount_pct,
            gst_rate_pct: invoice.gst_rate_pct,
            paid_amount: invoice.paid_amount,
        })
    }

    pub fn from_input(input: GstInput) -> Self {
        InvoiceForm {
            input,
            breakdown: input.breakdown(),
        }
    }

    pub fn input(&self) -> &GstInput {
        &self.input
    }

    pub fn breakdown(&self) -> &GstBreakdown {
        &self.breakdown
    }

    pub fn remaining_amount(&self) -> f64 {
        self.breakdown.remaining_amount
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.input.amount = amount;
        self.recompute();
    }

    pub fn set_discount_pct(&mut self, discount_pct: f64) {
        self.input.discount_pct = discount_pct;
        self.recompute();
    }

    pub fn set_gst_rate_pct(&mut self, gst_rate_pct: f64) {
        self.input.gst_rate_pct = gst_rate_pct;
        self.recompute();
    }

    pub fn set_paid_amount(&mut self, paid_amount: f64) {
        self.input.paid_amount = paid_amount;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.breakdown = self.input.breakdown();
    }

    /// Percentages outside 0..=100, for the dialog to flag.
    ///
    /// Totals are still computed for out-of-range values.
    pub fn issues(&self) -> Vec<ValidationError> {
        [
            validate_percentage("discount", self.input.discount_pct),
            validate_percentage("gst rate", self.input.gst_rate_pct),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }

    /// Writes inputs and derived totals into `invoice` before submit.
    pub fn apply_to(&self, invoice: &mut Invoice) {
        invoice.amount = self.input.amount;
        invoice.discount_pct = self.input.discount_pct;
        invoice.gst_rate_pct = self.input.gst_rate_pct;
        invoice.paid_amount = self.input.paid_amount;
        invoice.total_with_gst = self.breakdown.total_with_gst;
        invoice.remaining_amount = self.breakdown.remaining_amount;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_invoice() {
        let totals = calculate_gst(1000.0, 10.0, 18.0, 500.0);
        assert_eq!(totals.discounted_amount, 900.0);
        assert_eq!(totals.gst_amount, 162.0);
        assert_eq!(totals.total_without_gst, 900.0);
        assert_eq!(totals.total_with_gst, 1062.0);
        assert_eq!(totals.remaining_amount, 562.0);
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(calculate_gst(0.0, 0.0, 0.0, 0.0), GstBreakdown::default());
    }

    #[test]
    fn test_full_discount() {
        let totals = calculate_gst(2500.0, 100.0, 18.0, 300.0);
        assert_eq!(totals.discounted_amount, 0.0);
        assert_eq!(totals.gst_amount, 0.0);
        assert_eq!(totals.total_with_gst, 0.0);
        assert_eq!(totals.remaining_amount, -300.0);
    }

    #[test]
    fn test_is_pure() {
        let first = calculate_gst(1234.5, 7.5, 12.0, 99.0);
        for _ in 0..10 {
            assert_eq!(calculate_gst(1234.5, 7.5, 12.0, 99.0), first);
        }
    }

    #[test]
    fn test_overpayment_goes_negative() {
        let totals = calculate_gst(100.0, 0.0, 18.0, 200.0);
        assert_eq!(totals.total_with_gst, 118.0);
        assert_eq!(totals.remaining_amount, -82.0);
    }

    #[test]
    fn test_form_reports_out_of_range_percentages() {
        let mut form = InvoiceForm::new();
        form.set_amount(1000.0);
        form.set_gst_rate_pct(18.0);
        assert!(form.issues().is_empty());

        form.set_discount_pct(150.0);
        assert_eq!(
            form.issues(),
            vec![ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: 100,
            }]
        );
        assert_eq!(form.breakdown().discounted_amount, -500.0);
    }

    #[test]
    fn test_no_bounds_checking() {
        let totals = calculate_gst(-100.0, 150.0, 10.0, 0.0);
        assert_eq!(totals.discounted_amount, 50.0);
        assert_eq!(totals.gst_amount, 5.0);
    }

    #[test]
    fn test_form_recomputes_on_every_input() {
        let mut form = InvoiceForm::new();
        form.set_amount(1000.0);
        assert_eq!(form.breakdown().total_with_gst, 1000.0);

        form.set_discount_pct(10.0);
        assert_eq!(form.breakdown().discounted_amount, 900.0);

        form.set_gst_rate_pct(18.0);
        assert_eq!(form.breakdown().total_with_gst, 1062.0);

        form.set_paid_amount(500.0);
        assert_eq!(form.remaining_amount(), 562.0);
    }

    #[test]
    fn test_round_currency() {
        assert_eq!(round_currency(1062.0, 2), 1062.0);
        assert_eq!(round_currency(10.555, 2), 10.56);
        assert_eq!(round_currency(10.554, 2), 10.55);
        assert_eq!(round_currency(99.5, 0), 100.0);
    }
}
