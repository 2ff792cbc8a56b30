//! Type-safe price representation using decimal arithmetic.
//!
//! The hosted database stores every amount as an integer count of minor
//! currency units (`price_cents`). [`Price`] keeps that integer and only
//! converts to a [`Decimal`] when formatting for display, so sums and
//! products stay exact.
//!
//! Display follows en-US currency conventions: a symbol prefix for the
//! currencies below, thousands separators, and the currency's usual number
//! of fraction digits (`$1,234.50`, `¥1,235`). Well-formed codes without a
//! known symbol render as `NGN 19.99`; malformed codes fall back to USD.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's minor unit (e.g., cents for USD).
    pub amount_cents: i64,
    /// ISO 4217 currency code as stored in the database.
    pub currency: String,
}

impl Price {
    /// Create a new price from minor units and a currency code.
    #[must_use]
    pub fn new(amount_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            amount_cents,
            currency: currency.into(),
        }
    }

    /// Amount in the currency's major unit (dollars, not cents).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.amount_cents, 2)
    }

    /// Known currency for this price, if the code is recognised.
    #[must_use]
    pub fn currency_code(&self) -> Option<CurrencyCode> {
        CurrencyCode::from_code(&self.currency)
    }

    /// Format for display (e.g., `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.currency.trim().to_ascii_uppercase();
        let amount = self.amount();
        let sign = if amount.is_sign_negative() && !amount.is_zero() {
            "-"
        } else {
            ""
        };

        if let Some(known) = CurrencyCode::from_code(&code) {
            let digits = group_digits(amount.abs(), known.decimal_places());
            return write!(f, "{sign}{}{digits}", known.symbol());
        }

        if is_iso_shaped(&code) {
            let digits = group_digits(amount.abs(), 2);
            return write!(f, "{sign}{code} {digits}");
        }

        let digits = group_digits(amount.abs(), CurrencyCode::USD.decimal_places());
        write!(f, "{sign}{}{digits}", CurrencyCode::USD.symbol())
    }
}

/// ISO 4217 currency codes with a dedicated display symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
    MXN,
    INR,
}

impl CurrencyCode {
    /// Parse a currency code, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            "JPY" => Some(Self::JPY),
            "MXN" => Some(Self::MXN),
            "INR" => Some(Self::INR),
            _ => None,
        }
    }

    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::JPY => "JPY",
            Self::MXN => "MXN",
            Self::INR => "INR",
        }
    }

    /// Display prefix used by en-US formatting.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{00a3}",
            Self::CAD => "CA$",
            Self::AUD => "A$",
            Self::JPY => "\u{00a5}",
            Self::MXN => "MX$",
            Self::INR => "\u{20b9}",
        }
    }

    /// Number of fraction digits shown for this currency.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn is_iso_shaped(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Render a non-negative amount with `,` thousands separators.
fn group_digits(amount: Decimal, decimal_places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let precision = decimal_places as usize;
    let text = format!("{rounded:.precision$}");
    let (int_part, frac_part) = text.split_once('.').map_or((text.as_str(), None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_usd() {
        assert_eq!(Price::new(1999, "USD").to_string(), "$19.99");
        assert_eq!(Price::new(3998, "usd").to_string(), "$39.98");
        assert_eq!(Price::new(0, "USD").to_string(), "$0.00");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(123_456_789, "USD").to_string(), "$1,234,567.89");
        assert_eq!(Price::new(100_000, "EUR").to_string(), "\u{20ac}1,000.00");
    }

    #[test]
    fn test_display_zero_decimal_currency_rounds() {
        // 1999 minor units is 19.99 major units, shown without fractions.
        assert_eq!(Price::new(1999, "JPY").to_string(), "\u{a5}20");
        assert_eq!(Price::new(12_345_600, "JPY").to_string(), "\u{a5}123,456");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Price::new(-250, "USD").to_string(), "-$2.50");
    }

    #[test]
    fn test_display_unknown_but_well_formed_code() {
        assert_eq!(Price::new(1999, "NGN").to_string(), "NGN 19.99");
    }

    #[test]
    fn test_display_invalid_code_falls_back_to_usd() {
        assert_eq!(Price::new(1999, "").to_string(), "$19.99");
        assert_eq!(Price::new(1999, "dollars").to_string(), "$19.99");
    }

    #[test]
    fn test_amount_is_exact() {
        assert_eq!(Price::new(1999, "USD").amount(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_currency_code_lookup() {
        assert_eq!(CurrencyCode::from_code(" gbp "), Some(CurrencyCode::GBP));
        assert_eq!(CurrencyCode::from_code("XYZ"), None);
        assert_eq!(CurrencyCode::CAD.to_string(), "CAD");
    }
}
