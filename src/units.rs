//! Conversion of user-facing lengths into the engine's integer millimetres.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InputError;
use crate::types::Dim;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Mm,
    Cm,
    M,
    In,
}

impl Unit {
    pub fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::M => 1000.0,
            Unit::In => 25.4,
        }
    }

    /// Converts a length in this unit to whole millimetres, rounding to nearest.
    pub fn to_mm(self, value: f64) -> Dim {
        (value * self.mm_per_unit()).round() as Dim
    }
}

impl std::str::FromStr for Unit {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "m" => Ok(Unit::M),
            "in" | "inch" => Ok(Unit::In),
            _ => Err(InputError::UnknownUnit(s.to_string())),
        }
    }
}

/// Accepts integer or floating JSON numbers for a dimension, rounding floats.
pub fn deserialize_dim<'de, D>(deserializer: D) -> Result<Dim, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(v) if v.is_finite() => Ok(v.round() as Dim),
        Number::Float(v) => Err(D::Error::custom(format!("invalid dimension {v}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mm() {
        assert_eq!(Unit::Mm.to_mm(12.4), 12);
        assert_eq!(Unit::Cm.to_mm(150.0), 1500);
        assert_eq!(Unit::M.to_mm(2.07), 2070);
        assert_eq!(Unit::In.to_mm(1.0), 25);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("in".parse::<Unit>().unwrap(), Unit::In);
        assert!(matches!(
            "yd".parse::<Unit>(),
            Err(InputError::UnknownUnit(u)) if u == "yd"
        ));
    }
}
