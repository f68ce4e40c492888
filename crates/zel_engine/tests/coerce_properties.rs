use proptest::prelude::*;
use zel_engine::Engine;

/// Reference modular narrowing, written out the way the conversion is
/// defined: truncate, reduce mod 2^32, shift into the signed range.
fn int32_reference(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let t = n.trunc();
    let m = t.rem_euclid(4294967296.0);
    if m >= 2147483648.0 {
        (m - 4294967296.0) as i32
    } else {
        m as i32
    }
}

proptest! {
    #[test]
    fn int_handles_stringify_like_std(i in any::<i64>()) {
        let mut engine = Engine::new();
        let handle = engine.alloc_int(i);
        prop_assert_eq!(engine.coerce_string(handle), i.to_string());
    }

    #[test]
    fn int_handles_round_trip_through_int64(i in any::<i64>()) {
        let mut engine = Engine::new();
        let handle = engine.alloc_int(i);
        prop_assert_eq!(engine.coerce_int64(handle), i);
    }

    #[test]
    fn number_int32_matches_reference(n in any::<f64>()) {
        let mut engine = Engine::new();
        let handle = engine.alloc_number(n);
        prop_assert_eq!(engine.coerce_int32(handle), int32_reference(n));
    }

    #[test]
    fn in_range_doubles_narrow_exactly(i in -2147483648i64..=2147483647) {
        let mut engine = Engine::new();
        let handle = engine.alloc_number(i as f64);
        prop_assert_eq!(engine.coerce_int32(handle), i as i32);
    }

    #[test]
    fn numeric_strings_parse_back(n in any::<i32>()) {
        let mut engine = Engine::new();
        let handle = engine.alloc_str(&n.to_string());
        prop_assert_eq!(engine.coerce_number(handle), n as f64);
    }

    #[test]
    fn truthiness_of_ints_is_nonzero(i in any::<i64>()) {
        let mut engine = Engine::new();
        let handle = engine.alloc_int(i);
        prop_assert_eq!(engine.truthiness(handle), i != 0);
    }
}
