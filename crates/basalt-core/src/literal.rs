//! Compile-time constant values.

use std::fmt;

use ordered_float::OrderedFloat;

/// A folded compile-time constant.
///
/// Floats are single precision and compared by value through [`OrderedFloat`],
/// so constant types holding equal literals compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// 32-bit integer.
    Int(i32),
    /// 32-bit float.
    Float(OrderedFloat<f32>),
    /// String payload.
    String(String),
    /// The null struct reference.
    Null,
}

impl Literal {
    /// Create a float literal.
    pub fn float(value: f32) -> Self {
        Literal::Float(OrderedFloat(value))
    }

    /// Integer value of this literal.
    ///
    /// Floats round to nearest (halves away from zero); unparsable strings
    /// and null yield 0.
    pub fn as_int(&self) -> i32 {
        match self {
            Literal::Int(v) => *v,
            Literal::Float(v) => v.0.round() as i32,
            Literal::String(s) => s.trim().parse::<i32>().unwrap_or_else(|_| {
                s.trim().parse::<f32>().map(|f| f as i32).unwrap_or(0)
            }),
            Literal::Null => 0,
        }
    }

    /// Float value of this literal.
    pub fn as_float(&self) -> f32 {
        match self {
            Literal::Int(v) => *v as f32,
            Literal::Float(v) => v.0,
            Literal::String(s) => s.trim().parse::<f32>().unwrap_or(0.0),
            Literal::Null => 0.0,
        }
    }

    /// String value of this literal.
    pub fn as_string(&self) -> String {
        match self {
            Literal::Int(v) => v.to_string(),
            Literal::Float(v) => format!("{:?}", v.0),
            Literal::String(s) => s.clone(),
            Literal::Null => String::new(),
        }
    }

    /// Whether this is the null reference (or the integer zero, which folds to it).
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null | Literal::Int(0))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{:?}", v.0),
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Null => write!(f, "Null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_int_rounds_to_nearest() {
        assert_eq!(Literal::float(2.4).as_int(), 2);
        assert_eq!(Literal::float(2.5).as_int(), 3);
        assert_eq!(Literal::float(-2.5).as_int(), -3);
    }

    #[test]
    fn string_conversions() {
        assert_eq!(Literal::String("42".into()).as_int(), 42);
        assert_eq!(Literal::String(" 7.9 ".into()).as_int(), 7);
        assert_eq!(Literal::String("abc".into()).as_int(), 0);
        assert_eq!(Literal::String("1.5".into()).as_float(), 1.5);
        assert_eq!(Literal::Int(12).as_string(), "12");
        assert_eq!(Literal::float(2.0).as_string(), "2.0");
    }

    #[test]
    fn floats_compare_by_value() {
        assert_eq!(Literal::float(1.5), Literal::float(1.5));
        assert_ne!(Literal::float(1.5), Literal::Int(1));
    }

    #[test]
    fn null_detection() {
        assert!(Literal::Null.is_null());
        assert!(Literal::Int(0).is_null());
        assert!(!Literal::Int(3).is_null());
        assert!(!Literal::String(String::new()).is_null());
    }
}
