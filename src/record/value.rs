//! Scalar field values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value, parsing text when needed
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Render a float the way Python's `repr` does: `35.0`, `1e+16`, `1e-05`, `nan`
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    // Debug keeps the trailing ".0" and switches to exponent form at the same
    // thresholds as Python, but writes the exponent bare (`1e16`, `1e-5`)
    let text = format!("{:?}", v);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_number() {
        assert_eq!(Value::from(35).as_number(), Some(35.0));
        assert_eq!(Value::from(2.5).as_number(), Some(2.5));
        assert_eq!(Value::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(Value::from("Sales").as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(35).to_string(), "35");
        assert_eq!(Value::from(35.0).to_string(), "35.0");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from("Sales").to_string(), "Sales");
    }

    #[test]
    fn test_display_float_exponent() {
        assert_eq!(Value::from(1e16).to_string(), "1e+16");
        assert_eq!(Value::from(1e-5).to_string(), "1e-05");
        assert_eq!(Value::from(1.5e300).to_string(), "1.5e+300");
        assert_eq!(Value::from(-2.5e-7).to_string(), "-2.5e-07");
        assert_eq!(Value::from(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::from(0.0001).to_string(), "0.0001");
    }

    #[test]
    fn test_display_non_finite() {
        assert_eq!(Value::from(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::from(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[35, 1.5, "Sales"]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Integer(35), Value::Float(1.5), Value::Text("Sales".to_string())]
        );
    }
}
