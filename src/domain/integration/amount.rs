//! Payment amount in the gateway's major currency unit.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Amount as the caller sent it, in major units (`5` is five ringgit).
///
/// The numeric value is kept verbatim and forwarded without any scaling.
/// String input such as `"5.00"` is accepted and re-emitted as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Amount(Number);

impl Amount {
    pub fn new(value: Number) -> Result<Self, ValidationError> {
        match value.as_f64() {
            Some(v) if v.is_finite() && v > 0.0 => Ok(Self(value)),
            _ => Err(ValidationError::invalid_format(
                "amount",
                "must be a positive number",
            )),
        }
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = Number::from_str(s.trim())
            .map_err(|_| ValidationError::invalid_format("amount", "not a number"))?;
        Self::new(number)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(Number),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Amount::new(n).map_err(de::Error::custom),
            Raw::Text(s) => Amount::from_str(&s).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn five_stays_five() {
        let amount: Amount = serde_json::from_value(json!(5)).unwrap();
        assert_eq!(serde_json::to_value(&amount).unwrap(), json!(5));
    }

    #[test]
    fn decimal_string_becomes_number() {
        let amount: Amount = serde_json::from_value(json!("12.50")).unwrap();
        assert_eq!(serde_json::to_value(&amount).unwrap(), json!(12.5));
    }

    #[test]
    fn zero_and_negative_are_rejected() {
        assert!(serde_json::from_value::<Amount>(json!(0)).is_err());
        assert!(serde_json::from_value::<Amount>(json!(-3)).is_err());
        assert!(serde_json::from_value::<Amount>(json!("abc")).is_err());
    }

    proptest! {
        #[test]
        fn integer_amounts_pass_through_unscaled(units in 1u64..1_000_000) {
            let amount: Amount = serde_json::from_value(json!(units)).unwrap();
            prop_assert_eq!(serde_json::to_value(&amount).unwrap(), json!(units));
        }
    }
}
