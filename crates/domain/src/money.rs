//! Fixed-point money.

use serde::{Deserialize, Serialize};

/// Error returned when a wire amount string is not an exact two-decimal
/// amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {0:?}")]
pub struct ParseAmountError(pub String);

/// Money amount represented in cents to avoid floating point issues.
///
/// Order totals and snapshotted unit prices are compared with exact
/// equality; no float ever enters the comparison path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = 10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole currency units.
    pub fn from_units(units: i64) -> Self {
        Self { cents: units * 100 }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Formats the amount the way the payment gateway expects it on the
    /// wire: no currency symbol, always two fraction digits (`"200.00"`).
    pub fn amount_string(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        format!("{sign}{}.{:02}", (self.cents / 100).abs(), self.cents.abs() % 100)
    }

    /// Parses a wire amount string into exact cents.
    ///
    /// `"200"`, `"200.0"` and `"200.00"` all parse to 20000 cents.
    /// Fraction digits past the second must be zero; anything else is an
    /// error rather than a rounded value, because a rounded amount can
    /// never be compared exactly against a stored total.
    pub fn parse_amount(s: &str) -> Result<Money, ParseAmountError> {
        let err = || ParseAmountError(s.to_string());
        let trimmed = s.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((_, "")) => return Err(err()),
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        // Beyond two fraction digits only trailing zeros are acceptable.
        if frac_part.len() > 2 && !frac_part[2..].bytes().all(|b| b == b'0') {
            return Err(err());
        }

        let units: i64 = int_part.parse().map_err(|_| err())?;
        let frac = frac_part.as_bytes();
        let mut cents_part = 0i64;
        if let Some(&d) = frac.first() {
            cents_part += ((d - b'0') as i64) * 10;
        }
        if let Some(&d) = frac.get(1) {
            cents_part += (d - b'0') as i64;
        }

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents_part))
            .map(Money::from_cents)
            .ok_or_else(err)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount_string())
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert!(money.is_positive());
    }

    #[test]
    fn test_money_from_units() {
        assert_eq!(Money::from_units(50).cents(), 5000);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [100, 250, 30].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 380);
    }

    #[test]
    fn test_amount_string() {
        assert_eq!(Money::from_cents(20000).amount_string(), "200.00");
        assert_eq!(Money::from_cents(1234).amount_string(), "12.34");
        assert_eq!(Money::from_cents(5).amount_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).amount_string(), "-12.34");
    }

    #[test]
    fn test_parse_amount_equivalent_forms() {
        for form in ["200", "200.0", "200.00", "200.000", " 200.00 "] {
            assert_eq!(Money::parse_amount(form).unwrap().cents(), 20000, "{form}");
        }
        assert_eq!(Money::parse_amount("12.34").unwrap().cents(), 1234);
        assert_eq!(Money::parse_amount("0.5").unwrap().cents(), 50);
    }

    #[test]
    fn test_parse_amount_rejects_inexact_or_garbage() {
        for bad in ["12.345", "abc", "", ".", "12.", "-5", "1,000.00", "12.3a"] {
            assert!(Money::parse_amount(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_parse_amount_never_rounds() {
        // 12.349 would round to 12.35; it must be rejected instead.
        assert_eq!(
            Money::parse_amount("12.349"),
            Err(ParseAmountError("12.349".to_string()))
        );
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(Money::from_cents(20000).to_string(), "200.00");
    }
}
