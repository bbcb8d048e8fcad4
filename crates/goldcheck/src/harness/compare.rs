//! Comparator - Exact deep equality of normalized documents
//!
//! Mappings compare regardless of entry order, sequences element by element,
//! and numbers by numeric value, so `1` and `1.0` are equal. NaN equals NaN
//! so that every document equals itself. There is no tolerance otherwise.

use serde_yaml::Number;

use super::loader::{Loaded, Value};

/// Compare two loaded documents.
///
/// Two undecodable documents are equal whatever their reasons; an
/// undecodable document never equals a decoded one.
pub fn loaded_equal(actual: &Loaded, expected: &Loaded) -> bool {
    match (actual, expected) {
        (Loaded::Decoded(a), Loaded::Decoded(b)) => values_equal(a, b),
        (Loaded::Undecodable(_), Loaded::Undecodable(_)) => true,
        _ => false,
    }
}

/// Recursive structural equality of two values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Mapping(xs), Value::Mapping(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        (Value::Tagged(x), Value::Tagged(y)) => x.tag == y.tag && values_equal(&x.value, &y.value),
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (as_integer(x), as_integer(y)) {
        (Some(i), Some(j)) => i == j,
        _ => match (x.as_f64(), y.as_f64()) {
            (Some(f), Some(g)) => f == g || (f.is_nan() && g.is_nan()),
            _ => false,
        },
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_mapping_order_irrelevant() {
        assert!(values_equal(&yaml("{a: 1, b: 2}"), &yaml("{b: 2, a: 1}")));
    }

    #[test]
    fn test_sequence_order_matters() {
        assert!(!values_equal(&yaml("[1, 2]"), &yaml("[2, 1]")));
    }

    #[test]
    fn test_int_equals_float_of_same_value() {
        assert!(values_equal(&yaml("1"), &yaml("1.0")));
        assert!(!values_equal(&yaml("1"), &yaml("1.5")));
    }

    #[test]
    fn test_large_unsigned_vs_negative() {
        assert!(!values_equal(
            &yaml("18446744073709551615"),
            &yaml("-1")
        ));
    }

    #[test]
    fn test_nan_is_reflexive() {
        assert!(values_equal(&yaml(".nan"), &yaml(".nan")));
    }

    #[test]
    fn test_nested_difference_detected() {
        let a = yaml("[{MEM: {'1': 2}, PC: 0}]");
        let b = yaml("[{MEM: {'1': 3}, PC: 0}]");
        assert!(!values_equal(&a, &b));
    }

    #[test]
    fn test_extra_key_detected() {
        assert!(!values_equal(&yaml("{a: 1}"), &yaml("{a: 1, b: 2}")));
        assert!(!values_equal(&yaml("{a: 1, b: 2}"), &yaml("{a: 1}")));
    }

    #[test]
    fn test_kinds_never_cross() {
        assert!(!values_equal(&yaml("'1'"), &yaml("1")));
        assert!(!values_equal(&yaml("null"), &yaml("false")));
        assert!(!values_equal(&yaml("[]"), &yaml("{}")));
    }

    #[test]
    fn test_undecodable_semantics() {
        let absent_a = Loaded::Undecodable("empty document".to_string());
        let absent_b = Loaded::Undecodable("invalid JSON".to_string());
        let present = Loaded::Decoded(yaml("[]"));

        assert!(loaded_equal(&absent_a, &absent_b));
        assert!(!loaded_equal(&absent_a, &present));
        assert!(!loaded_equal(&present, &absent_b));
        assert!(loaded_equal(&present, &present));
    }
}
