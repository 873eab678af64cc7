use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A signed monetary amount. Keeps the full precision of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Parse a ledger amount such as `"$1,234.56"`, `"(1,234.56)"` or `" 12 "`.
    ///
    /// Currency symbols and thousands separators are dropped and a wrapping
    /// parenthesis pair means negative. Returns `None` for anything that is
    /// not a finite decimal afterwards, including the empty string.
    pub fn parse(text: &str) -> Option<Money> {
        let cleaned = text.trim().replace(['$', ','], "");
        let cleaned = cleaned.trim();

        let (negative, digits) = match cleaned.strip_prefix('(') {
            Some(inner) => (true, inner.strip_suffix(')').unwrap_or(inner).trim()),
            None => (false, cleaned),
        };
        if digits.is_empty() {
            return None;
        }

        let value = Decimal::from_str(digits)
            .or_else(|_| Decimal::from_scientific(digits))
            .ok()?;
        Some(Money(if negative { -value } else { value }))
    }

    /// Like [`Money::parse`] but unparseable text counts as zero.
    pub fn parse_or_zero(text: &str) -> Money {
        Self::parse(text).unwrap_or_default()
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_sign_negative() && !self.0.is_zero() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}
