//! # Money Module
//!
//! Provides the `Money` type for handling rental prices and totals safely.
//!
//! ## Why Four Decimal Places?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PERCENTAGES OF CENT AMOUNTS ARE NOT CENT AMOUNTS                       │
//! │                                                                         │
//! │  Subtotal:         $137.97                                              │
//! │  Service fee 5%:   $6.8985     ← half a cent would be lost in cents     │
//! │  Tax 10%:          $13.797                                              │
//! │  Grand total:      $158.6655                                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer ten-thousandths (1 unit = $0.0001)               │
//! │    Any cent amount × any whole basis-point rate is exact.               │
//! │    Rounding to cents happens only when a value is displayed.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use melar_core::money::Money;
//!
//! let price = Money::parse("45.99").unwrap();    // from a backend decimal
//! let also = Money::from_cents(4599);            // same value
//! assert_eq!(price, also);
//!
//! let three_days = price * 3;
//! assert_eq!(three_days.to_string(), "$137.97");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;
use crate::pricing::Rate;

/// Units per major currency unit.
pub const SCALE: i64 = 10_000;

/// Integer division that rounds halves away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in ten-thousandths of the major currency unit.
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► CartLineItem.unit_price_per_day ──► line_total()
///                                                           │
///                   MoneyTotals { subtotal, fee, tax, grand_total } ◄──┘
///                                                           │
///                   OrderGroup.total ──► order payload / rental record
/// ```
///
/// ## Wire Format
/// Serialized as a decimal string (`"137.97"`, `"6.8985"`), which is what the
/// backend's decimal fields produce. Deserialization also accepts JSON numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from raw units (1 unit = 1/10000).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use melar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.units(), 10_990_000 / 100);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents * (SCALE / 100))
    }

    /// Creates a Money value from major units and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, cents: i64) -> Self {
        if major < 0 {
            Money::from_cents(major * 100 - cents)
        } else {
            Money::from_cents(major * 100 + cents)
        }
    }

    /// Returns the raw unit count.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns the value rounded to whole cents (half away from zero).
    ///
    /// ```rust
    /// use melar_core::money::Money;
    ///
    /// assert_eq!(Money::parse("6.8985").unwrap().cents(), 690);
    /// assert_eq!(Money::parse("13.797").unwrap().cents(), 1380);
    /// ```
    pub fn cents(&self) -> i64 {
        div_round(self.0 as i128, (SCALE / 100) as i128) as i64
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a basis-point rate (fee, tax) to this amount.
    ///
    /// ## Implementation
    /// `(units × bps) / 10000`, computed in i128 and rounded half away from
    /// zero. For any amount that is a whole number of cents the division is
    /// exact, so no rounding ever happens on cart totals.
    ///
    /// ## Example
    /// ```rust
    /// use melar_core::money::Money;
    /// use melar_core::pricing::Rate;
    ///
    /// let subtotal = Money::parse("137.97").unwrap();
    /// let fee = subtotal.apply_rate(Rate::from_bps(500));
    /// assert_eq!(fee.to_decimal_string(), "6.8985");
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let raw = div_round(self.0 as i128 * rate.bps() as i128, 10_000);
        Money(raw.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Multiplies money by a quantity (or a day count), saturating at the
    /// representable range.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// `None` when the sum does not fit.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Parses a decimal amount such as `"45.99"`, `"-5.5"` or `"100"`.
    ///
    /// ## Rules
    /// - Optional leading sign
    /// - At most 4 fractional digits (finer amounts are not representable)
    /// - Surrounding whitespace is ignored
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(invalid("expected a decimal number"));
        }
        if frac.len() > 4 {
            return Err(invalid("at most 4 decimal places"));
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount too large"))?
        };
        let frac_units: i64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<4}", frac)
                .parse()
                .map_err(|_| invalid("expected a decimal number"))?
        };

        let units = whole_units
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_units))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -units } else { units }))
    }

    /// Formats as a plain decimal with 2 to 4 fractional digits.
    ///
    /// ```rust
    /// use melar_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(13797).to_decimal_string(), "137.97");
    /// assert_eq!(Money::from_units(68985).to_decimal_string(), "6.8985");
    /// assert_eq!(Money::zero().to_decimal_string(), "0.00");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let mut frac = format!("{:04}", abs % SCALE as u64);
        while frac.len() > 2 && frac.ends_with('0') {
            frac.pop();
        }
        format!("{}{}.{}", sign, whole, frac)
    }

    /// Formats rounded to cents with the given currency symbol.
    pub fn format_with(&self, symbol: &str) -> String {
        let cents = self.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{}{}{}.{:02}", sign, symbol, abs / 100, abs % 100)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display rounds to cents: `$6.8985` shows as `$6.90`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

// Operators saturate. Paths that must refuse an out-of-range amount use
// `checked_mul` / `checked_add` instead.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(SCALE)
            .map(Money)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount too large"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        let scaled = (v * SCALE as f64).round();
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
            return Err(E::custom("amount out of range"));
        }
        Ok(Money(scaled as i64))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
