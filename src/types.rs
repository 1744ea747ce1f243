//! Core types: Price, Ticker, Shares

use std::fmt;

/// Price in smallest currency units (cents).
///
/// `Price(10050)` represents $100.50. Every monetary computation in the
/// ledger and the rebalancer stays in integer cents; decimal values only
/// appear at the view boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Convert a decimal currency amount to cents, rounding half away from zero.
    ///
    /// ```
    /// use sharebook::Price;
    ///
    /// assert_eq!(Price::from_decimal(4.15), Price(415));
    /// assert_eq!(Price::from_decimal(101.28), Price(101_28));
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Price((amount * 100.0).round() as i64)
    }

    /// The amount as decimal currency, rounded to two fractional digits.
    #[inline]
    pub fn to_decimal(self) -> f64 {
        round2(self.0 as f64 / 100.0)
    }

    /// Raw cents.
    #[inline]
    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.0 / 100;
        let cents = (self.0 % 100).abs();
        if self.0 < 0 {
            write!(f, "-${}.{:02}", dollars.abs(), cents)
        } else {
            write!(f, "${}.{:02}", dollars, cents)
        }
    }
}

/// Number of whole shares. Signed: the ledger accepts negative holdings
/// as given, and rebalance deltas are negative for sells.
pub type Shares = i64;

/// Case-insensitive share identifier, stored lower-cased.
///
/// ```
/// use sharebook::Ticker;
///
/// assert_eq!(Ticker::new("AAPL"), Ticker::new("aapl"));
/// assert_eq!(Ticker::new("Goog").as_str(), "goog");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct Ticker(String);

impl Ticker {
    pub fn new(s: &str) -> Self {
        Ticker(s.to_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form, as tickers are usually quoted to people.
    pub fn to_uppercase(&self) -> String {
        self.0.to_uppercase()
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Ticker::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Ticker::new(&s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

impl PartialEq<str> for Ticker {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ticker {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serde adapter for a [`Price`] written as decimal currency (`4.0` for `Price(400)`).
#[cfg(feature = "serde")]
pub(crate) mod price_decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Price;

    pub fn serialize<S: Serializer>(price: &Price, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(price.to_decimal())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Price, D::Error> {
        f64::deserialize(d).map(Price::from_decimal)
    }
}

/// Round to two fractional digits.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_from_decimal_rounds() {
        assert_eq!(Price::from_decimal(5.5), Price(5_50));
        assert_eq!(Price::from_decimal(4.15), Price(4_15));
        assert_eq!(Price::from_decimal(0.005), Price(1));
        assert_eq!(Price::from_decimal(-2.5), Price(-2_50));
    }

    #[test]
    fn price_to_decimal() {
        assert_eq!(Price(23_45).to_decimal(), 23.45);
        assert_eq!(Price::ZERO.to_decimal(), 0.0);
    }

    #[test]
    fn price_display() {
        assert_eq!(format!("{}", Price(10050)), "$100.50");
        assert_eq!(format!("{}", Price(5)), "$0.05");
        assert_eq!(format!("{}", Price(-250)), "-$2.50");
    }

    #[test]
    fn ticker_normalizes_case() {
        let t = Ticker::new("MsFt");
        assert_eq!(t, "msft");
        assert_eq!(t.to_uppercase(), "MSFT");
        assert_eq!(format!("{t}"), "msft");
        assert_eq!(Ticker::from(String::from("SPY")), Ticker::new("spy"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ticker_deserializes_lower_cased() {
        let t: Ticker = serde_json::from_str(r#""AAPL""#).unwrap();
        assert_eq!(t, "aapl");
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""aapl""#);
    }

    #[test]
    fn round2_two_places() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(-0.004), -0.0);
    }
}
