use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

/// ISO-like currency code used by a group and its money values.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units** (see
/// [`MoneyCents`]). `minor_units()` returns how many decimal digits are used
/// when converting between:
/// - major units (human input/output, e.g. `1200.50 INR`)
/// - minor units (stored integers, e.g. `120050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Inr | Currency::Eur | Currency::Usd => 2,
        }
    }

    /// Formats an amount for display, e.g. `₹1,200.00` or `-€3.50`.
    #[must_use]
    pub fn format(self, amount: MoneyCents) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let digits = usize::from(self.minor_units());
        let scale = 10u64.pow(u32::from(self.minor_units()));
        let abs = amount.cents().unsigned_abs();
        let units = (abs / scale).to_string();

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (idx, ch) in units.chars().enumerate() {
            if idx > 0 && (units.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if digits == 0 {
            return format!("{sign}{}{grouped}", self.symbol());
        }
        let fraction = abs % scale;
        format!("{sign}{}{grouped}.{fraction:0digits$}", self.symbol())
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
