//! Value model tests: literal parsing, coercion, operators and memoization.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::error::ErrorCode;
    use crate::runtime::storage::Storage;
    use crate::runtime::value::{Kind, Value, ValueError};
    use crate::types::color::Color;

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn lit(text: &str) -> Value {
        Value::parse(text, None).unwrap_or_else(|e| panic!("`{text}` failed to parse: {e}"))
    }

    fn eval(text: &str, storage: &Storage) -> Result<Value, ValueError> {
        Value::parse(text, Some(storage))?.resolve(storage)
    }

    fn eval_ok(text: &str) -> Value {
        eval(text, &Storage::new()).unwrap_or_else(|e| panic!("`{text}` failed: {e}"))
    }

    fn eval_err(text: &str) -> ErrorCode {
        match eval(text, &Storage::new()) {
            Ok(v) => panic!("expected `{text}` to fail, got {v:?}"),
            Err(e) => e.code(),
        }
    }

    fn storage_with(vars: &[(&str, Value)]) -> Storage {
        let mut s = Storage::new();
        for (name, v) in vars {
            s.declare(name, Some(v.clone())).expect("declare failed");
        }
        s
    }

    // ─── Literals ────────────────────────────────────────────────────────────

    #[test]
    fn literal_kinds() {
        assert!(matches!(lit("42"), Value::Int(42)));
        assert!(matches!(lit("-7"), Value::Int(-7)));
        assert!(matches!(lit("2.5"), Value::Double(d) if d == 2.5));
        assert!(matches!(lit("red"), Value::Color(c) if c == Color::rgb(255, 0, 0)));
        assert!(matches!(lit("off"), Value::Bool(false)));
        assert!(matches!(lit("true"), Value::Bool(true)));
    }

    #[test]
    fn eight_digit_hex_puts_alpha_first() {
        let Value::Color(c) = lit("#80ff0010") else { panic!("expected color") };
        assert_eq!(c, Color::rgba(0xff, 0x00, 0x10, 0x80));
    }

    #[test]
    fn malformed_literals() {
        assert_eq!(Value::parse("1x", None).unwrap_err().code(), ErrorCode::P002);
        assert_eq!(Value::parse("1.2.3", None).unwrap_err().code(), ErrorCode::P002);
        assert_eq!(Value::parse("fuchsia", None).unwrap_err().code(), ErrorCode::P001);
    }

    #[test]
    fn unknown_identifier_with_storage_is_undeclared() {
        assert_eq!(eval_err("width"), ErrorCode::N003);
    }

    // ─── Coercion ────────────────────────────────────────────────────────────

    #[test]
    fn coercions() {
        let s = Storage::new();
        assert_eq!(lit("3").to_double(&s), Ok(3.0));
        assert_eq!(lit("3.9").to_int(&s), Ok(3));
        assert_eq!(lit("-3.9").to_int(&s), Ok(-3));
        assert_eq!(lit("0").to_bool(&s), Ok(false));
        assert_eq!(lit("5").to_bool(&s), Ok(true));
        assert_eq!(
            lit("on").to_int(&s),
            Err(ValueError::TypeMismatch { expected: Kind::Int, found: Kind::Bool })
        );
        assert_eq!(
            lit("blue").to_double(&s),
            Err(ValueError::TypeMismatch { expected: Kind::Double, found: Kind::Color })
        );
    }

    #[test]
    fn kind_coercion_table() {
        assert!(Kind::Int.coerces_to(Kind::Double));
        assert!(Kind::Double.coerces_to(Kind::Int));
        assert!(Kind::Int.coerces_to(Kind::Bool));
        assert!(!Kind::Bool.coerces_to(Kind::Int));
        assert!(!Kind::Color.coerces_to(Kind::Double));
    }

    // ─── Operators ───────────────────────────────────────────────────────────

    #[test]
    fn arithmetic_precedence() {
        assert!(matches!(eval_ok("2 + 3 * 4"), Value::Int(14)));
        assert!(matches!(eval_ok("10 - 4 - 3"), Value::Int(3)));
        assert!(matches!(eval_ok("7 / 2"), Value::Int(3)));
        assert!(matches!(eval_ok("1.5 * 2.0"), Value::Double(d) if d == 3.0));
    }

    #[test]
    fn arithmetic_failures() {
        assert_eq!(eval_err("10 / 0"), ErrorCode::E002);
        assert_eq!(eval_err("1.0 / 0.0"), ErrorCode::E002);
        assert_eq!(eval_err("9223372036854775807 + 1"), ErrorCode::E005);
        assert_eq!(eval_err("1 + 2.5"), ErrorCode::E001);
        assert_eq!(eval_err("red + blue"), ErrorCode::E003);
    }

    #[test]
    fn bool_arithmetic_is_logic() {
        assert!(matches!(eval_ok("true + false"), Value::Bool(true)));
        assert!(matches!(eval_ok("true - true"), Value::Bool(false)));
        assert!(matches!(eval_ok("true * false"), Value::Bool(false)));
        assert_eq!(eval_err("true / false"), ErrorCode::E003);
    }

    #[test]
    fn comparisons() {
        assert!(matches!(eval_ok("3 > 2"), Value::Bool(true)));
        assert!(matches!(eval_ok("3 < 2"), Value::Bool(false)));
        assert!(matches!(eval_ok("2 + 2 = 4"), Value::Bool(true)));
        assert!(matches!(eval_ok("1 != 2"), Value::Bool(true)));
        assert!(matches!(eval_ok("red = #ff0000"), Value::Bool(true)));
        assert_eq!(eval_err("red > blue"), ErrorCode::E003);
        assert_eq!(eval_err("1 < 2.0"), ErrorCode::E001);
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(eval_err("1 +"), ErrorCode::P001);
        assert_eq!(eval_err("1 < 2 < 3"), ErrorCode::P001);
    }

    #[test]
    fn comparison_kind_is_known_before_evaluation() {
        let s = storage_with(&[("x", Value::Int(1))]);
        let v = Value::parse("x > 0", Some(&s)).unwrap();
        assert!(!v.is_evaluated());
        assert_eq!(v.kind(), Some(Kind::Bool));
    }

    // ─── Variables & memoization ─────────────────────────────────────────────

    #[test]
    fn uninitialised_variable() {
        let mut s = Storage::new();
        s.declare("x", None).unwrap();
        assert!(matches!(Value::parse("x", Some(&s)), Ok(Value::VariableRef(ref n)) if n == "x"));
        assert_eq!(eval("x", &s).unwrap_err().code(), ErrorCode::E004);
    }

    #[test]
    fn expression_is_memoized_per_instance() {
        let mut s = storage_with(&[("x", Value::Int(1))]);
        let y = Value::parse("x + x", Some(&s)).unwrap();
        let template = y.clone();

        assert!(matches!(y.resolve(&s), Ok(Value::Int(2))));
        assert!(y.is_evaluated());

        s.set("x", Value::Int(5));
        assert!(matches!(y.resolve(&s), Ok(Value::Int(2))));
        assert!(matches!(y.clone().resolve(&s), Ok(Value::Int(2))));
        // A copy taken before evaluation starts over.
        assert!(matches!(template.resolve(&s), Ok(Value::Int(10))));
    }

    #[test]
    fn failed_evaluation_stays_pending() {
        let mut s = storage_with(&[("d", Value::Int(0))]);
        let v = Value::parse("10 / d", Some(&s)).unwrap();
        assert_eq!(v.resolve(&s).unwrap_err(), ValueError::DivideByZero);
        assert!(!v.is_evaluated());
        s.set("d", Value::Int(5));
        assert!(matches!(v.resolve(&s), Ok(Value::Int(2))));
    }

    #[test]
    fn describe_shows_structure_until_resolved() {
        let s = storage_with(&[("x", Value::Int(4))]);
        let v = Value::parse("x * 2 + 1", Some(&s)).unwrap();
        assert_eq!(v.describe(), "((x * 2) + 1)");
        v.resolve(&s).unwrap();
        assert_eq!(v.describe(), "9");
    }

    // ─── Properties ──────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn int_literal_round_trips(n in any::<i64>()) {
            let s = Storage::new();
            let v = Value::parse(&n.to_string(), None).unwrap();
            prop_assert_eq!(v.to_int(&s), Ok(n));
            prop_assert_eq!(v.clone().to_int(&s), Ok(n));
        }

        #[test]
        fn six_digit_hex_is_opaque(hex in "[0-9a-f]{6}") {
            let Ok(Value::Color(c)) = Value::parse(&format!("#{hex}"), None) else {
                panic!("`#{hex}` is not a color");
            };
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap();
            prop_assert_eq!(c, Color::rgba(byte(0), byte(2), byte(4), 255));
        }

        #[test]
        fn eight_digit_hex_alpha_leads(hex in "[0-9a-f]{8}") {
            let c = Color::from_hex(&hex).unwrap();
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap();
            prop_assert_eq!(c, Color::rgba(byte(2), byte(4), byte(6), byte(0)));
        }
    }
}
