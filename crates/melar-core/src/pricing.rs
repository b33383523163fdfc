//! # Rental Pricing
//!
//! Day counting, line totals, and the cart aggregate (subtotal, service fee,
//! tax, grand total).
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  (start, end) ──► day_count() ──► days ≥ 1                              │
//! │                                     │                                   │
//! │  unit price/day ────────────────────┼──► line_total() = p × d × q       │
//! │  quantity ──────────────────────────┘          │                        │
//! │                                                ▼                        │
//! │                                 subtotal = Σ line totals                │
//! │                                                │                        │
//! │                       FeeSchedule::totals() ◄──┘                        │
//! │                          │                                              │
//! │            ┌─────────────┼──────────────┐                               │
//! │            ▼             ▼              ▼                               │
//! │     service fee 5%    tax 10%    grand total = subtotal × 1.15          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are recomputed from the line items on every cart change. Nothing is
//! cached, so there is nothing to invalidate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// 500 bps = 5% service fee, 1000 bps = 10% tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

// =============================================================================
// Rental Period & Day Counting
// =============================================================================

/// Billable days between two calendar dates, both endpoints inclusive.
///
/// ## Rules
/// ```text
/// start == end          → 1
/// end == start + N days → N + 1
/// end <  start          → 1   (floor; add-to-cart rejects this earlier)
/// ```
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use melar_core::pricing::day_count;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// assert_eq!(day_count(jan(1), jan(3)), 3);
/// assert_eq!(day_count(jan(1), jan(1)), 1);
/// assert_eq!(day_count(jan(3), jan(1)), 1);
/// ```
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 1;
    }
    ((end - start).num_days() + 1).max(1)
}

/// A rental period: a pair of calendar dates with no time of day.
///
/// Field names match the backend (`start_date` / `end_date`, ISO format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RentalPeriod {
    /// Creates a period. Inverted ranges are representable; see [`Self::is_inverted`].
    pub const fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        RentalPeriod {
            start_date,
            end_date,
        }
    }

    /// Billable days for this period (always ≥ 1).
    pub fn day_count(&self) -> i64 {
        day_count(self.start_date, self.end_date)
    }

    /// True when the end date falls before the start date.
    pub fn is_inverted(&self) -> bool {
        self.end_date < self.start_date
    }
}

impl fmt::Display for RentalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start_date.format("%d %b %y"),
            self.end_date.format("%d %b %y")
        )
    }
}

// =============================================================================
// Line Totals
// =============================================================================

/// `unit_price_per_day × days × quantity`.
///
/// No discounts and no proration. Callers reject negative prices and
/// quantities before getting here; this function does not validate.
/// Saturates when the product does not fit; see [`checked_line_total`].
#[inline]
pub fn line_total(unit_price_per_day: Money, days: i64, quantity: i64) -> Money {
    unit_price_per_day
        .multiply_quantity(days)
        .multiply_quantity(quantity)
}

/// Like [`line_total`], but `None` instead of saturating.
///
/// ```rust
/// use melar_core::money::Money;
/// use melar_core::pricing::checked_line_total;
///
/// let price = Money::parse("15.00").unwrap();
/// assert_eq!(checked_line_total(price, 3, 2), Some(Money::parse("90.00").unwrap()));
/// assert_eq!(checked_line_total(price, i64::MAX, 2), None);
/// ```
pub fn checked_line_total(unit_price_per_day: Money, days: i64, quantity: i64) -> Option<Money> {
    unit_price_per_day.checked_mul(days)?.checked_mul(quantity)
}

// =============================================================================
// Fee Schedule & Aggregates
// =============================================================================

/// Derived money figures for a cart, an order group, or an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoneyTotals {
    pub subtotal: Money,
    pub service_fee: Money,
    pub tax: Money,
    pub grand_total: Money,
}

/// Percentages applied on top of a subtotal.
///
/// ## Defaults
/// - Service fee: 500 bps (5%)
/// - Tax: 1000 bps (10%)
///
/// Both are applied to the subtotal, never to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub service_fee: Rate,
    pub tax: Rate,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule {
            service_fee: Rate::from_bps(500),
            tax: Rate::from_bps(1000),
        }
    }
}

impl FeeSchedule {
    /// Creates a schedule from basis points.
    pub const fn from_bps(service_fee_bps: u32, tax_bps: u32) -> Self {
        FeeSchedule {
            service_fee: Rate::from_bps(service_fee_bps),
            tax: Rate::from_bps(tax_bps),
        }
    }

    /// Derives fee, tax and grand total from a subtotal.
    pub fn totals(&self, subtotal: Money) -> MoneyTotals {
        let service_fee = subtotal.apply_rate(self.service_fee);
        let tax = subtotal.apply_rate(self.tax);
        // Money addition saturates, so absurd subtotals clamp instead of wrapping.
        MoneyTotals {
            subtotal,
            service_fee,
            tax,
            grand_total: subtotal + service_fee + tax,
        }
    }

    /// Sums line totals, then derives the rest.
    pub fn totals_for<I>(&self, line_totals: I) -> MoneyTotals
    where
        I: IntoIterator<Item = Money>,
    {
        self.totals(line_totals.into_iter().sum())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_same_day_counts_one() {
        for d in 1..=31 {
            assert_eq!(day_count(jan(d), jan(d)), 1);
        }
    }

    #[test]
    fn test_inclusive_span() {
        for n in 1..=30u32 {
            assert_eq!(day_count(jan(1), jan(1 + n)), n as i64 + 1);
        }
        // across a month boundary
        let feb2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        assert_eq!(day_count(jan(31), feb2), 3);
    }

    #[test]
    fn test_inverted_range_floors_to_one() {
        assert_eq!(day_count(jan(10), jan(1)), 1);
        let period = RentalPeriod::new(jan(10), jan(1));
        assert!(period.is_inverted());
        assert_eq!(period.day_count(), 1);
    }

    #[test]
    fn test_line_total() {
        for (cents, qty, days) in [(0, 1, 1), (4599, 1, 3), (1000, 4, 7), (1, 999, 30)] {
            let price = Money::from_cents(cents);
            assert_eq!(
                line_total(price, days, qty),
                Money::from_cents(cents * qty * days)
            );
        }
    }

    #[test]
    fn test_totals_grand_is_115_percent() {
        let fees = FeeSchedule::default();
        for cents in [0, 1, 99, 13797, 250_000] {
            let subtotal = Money::from_cents(cents);
            let totals = fees.totals(subtotal);
            assert_eq!(
                totals.grand_total,
                subtotal.apply_rate(Rate::from_bps(11_500))
            );
            assert_eq!(
                totals.grand_total,
                totals.subtotal + totals.service_fee + totals.tax
            );
        }
    }

    #[test]
    fn test_single_item_scenario() {
        let period = RentalPeriod::new(jan(1), jan(3));
        let price = Money::parse("45.99").unwrap();

        let days = period.day_count();
        let line = line_total(price, days, 1);
        let totals = FeeSchedule::default().totals_for([line]);

        assert_eq!(days, 3);
        assert_eq!(line.to_decimal_string(), "137.97");
        assert_eq!(totals.subtotal.to_decimal_string(), "137.97");
        assert_eq!(totals.service_fee.to_decimal_string(), "6.8985");
        assert_eq!(totals.tax.to_decimal_string(), "13.797");
        assert_eq!(totals.grand_total.to_decimal_string(), "158.6655");
    }

    #[test]
    fn test_custom_schedule() {
        let fees = FeeSchedule::from_bps(0, 1100);
        let totals = fees.totals(Money::from_cents(10000));
        assert!(totals.service_fee.is_zero());
        assert_eq!(totals.tax, Money::from_cents(1100));
        assert_eq!(totals.grand_total, Money::from_cents(11100));
    }

    #[test]
    fn test_period_serde_uses_iso_dates() {
        let period = RentalPeriod::new(jan(1), jan(3));
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], "2024-01-03");
        assert_eq!(period.to_string(), "01 Jan 24 to 03 Jan 24");
    }
}
