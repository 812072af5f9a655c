use crate::types::errors::MonetaryError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{AddAssign, SubAssign};
use std::str::FromStr;
use tracing::{error, warn};

const DECIMAL_PLACES: usize = 4;
const SCALE: i64 = 10i64.pow(DECIMAL_PLACES as u32);

/// Fixed-point currency amount with four decimal places.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Monetary(i64);

impl Monetary {
    pub fn new() -> Self {
        Monetary(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_add(rhs.0).map(Monetary)
    }

    pub fn checked_sub(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_sub(rhs.0).map(Monetary)
    }

    /// Parses an amount coming from loosely-typed upstream data.
    ///
    /// Blank and malformed values are treated as absent rather than as errors,
    /// so a record with a broken amount still counts but contributes nothing.
    pub fn lenient(value: &str) -> Option<Monetary> {
        if value.trim().is_empty() {
            return None;
        }

        match Monetary::from_str(value) {
            Ok(amount) => Some(amount),
            Err(error) => {
                warn!("Treating amount '{value}' as absent: {error}");
                None
            }
        }
    }

    /// Serde adapter for optional amounts that must never fail a row.
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Monetary>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(Monetary::lenient))
    }
}

impl AddAssign<Monetary> for Monetary {
    fn add_assign(&mut self, rhs: Monetary) {
        if let Some(new_val) = self.checked_add(rhs) {
            self.0 = new_val.0;
        } else {
            error!("Monetary AddAssign error: Overflow")
        }
    }
}

impl SubAssign<Monetary> for Monetary {
    fn sub_assign(&mut self, rhs: Monetary) {
        if let Some(new_val) = self.checked_sub(rhs) {
            self.0 = new_val.0;
        } else {
            error!("Monetary SubAssign error: Overflow")
        }
    }
}

impl Display for Monetary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let integer = abs / SCALE as u64;
        let fraction = abs % SCALE as u64;
        write!(formatter, "{}{}.{:0width$}", sign, integer, fraction, width = DECIMAL_PLACES)
    }
}

impl FromStr for Monetary {
    type Err = MonetaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(MonetaryError::InvalidFormat("Value is an empty string".to_string()));
        }

        let (integer_part, fraction_part) = match value.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (value, None)
        };

        if fraction_part.is_some_and(|fraction| fraction.contains('.')) {
            return Err(MonetaryError::InvalidFormat("Value has more than one decimal point".to_string()));
        }

        //NOTE: ".5" and "-.5" have no integer digits but are still amounts
        let integer: i64 = match integer_part {
            "" | "-" | "+" if fraction_part.is_some_and(|fraction| !fraction.is_empty()) => 0,
            _ => integer_part.parse()?
        };

        let fraction: i64 = match fraction_part {
            Some(fraction) if !fraction.is_empty() => {
                if fraction.len() > DECIMAL_PLACES {
                    return Err(MonetaryError::InvalidFormat("Value has too many decimal places".to_string()));
                }

                if !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(MonetaryError::InvalidFormat(format!("Value has an invalid fraction part: {fraction}")));
                }

                format!("{:0<width$}", fraction, width = DECIMAL_PLACES).parse()?
            }
            _ => 0
        };

        let sign = if value.starts_with('-') { -1 } else { 1 };
        let result = integer.checked_mul(SCALE)
            .and_then(|v| v.checked_add(sign * fraction))
            .ok_or(MonetaryError::Overflow)?;

        Ok(Monetary(result))
    }
}

impl<'de> Deserialize<'de> for Monetary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Monetary::from_str(&value).map_err(de::Error::custom)
    }
}

impl Serialize for Monetary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
