//! Numeric intrinsics lowered from managed comparison and remainder operators
//!
//! Every comparison returns `1` when `a > b`, `-1` when `a < b` and `0`
//! otherwise. For floats this means any comparison involving NaN yields
//! `0`, because NaN is neither greater nor less than anything. That result
//! is kept even though it makes `compare` non-antisymmetric around NaN.

macro_rules! three_way {
    ($a:expr, $b:expr) => {
        if $a > $b {
            1
        } else if $a < $b {
            -1
        } else {
            0
        }
    };
}

/// Signed 32-bit comparison
#[inline]
pub fn compare_i32(a: i32, b: i32) -> i32 {
    three_way!(a, b)
}

/// Signed 64-bit comparison
#[inline]
pub fn compare_i64(a: i64, b: i64) -> i32 {
    three_way!(a, b)
}

/// Single-precision comparison, `0` if either operand is NaN
#[inline]
pub fn compare_f32(a: f32, b: f32) -> i32 {
    three_way!(a, b)
}

/// Double-precision comparison, `0` if either operand is NaN
#[inline]
pub fn compare_f64(a: f64, b: f64) -> i32 {
    three_way!(a, b)
}

/// 32-bit comparison by unsigned magnitude
#[inline]
pub fn compare_unsigned_i32(a: i32, b: i32) -> i32 {
    three_way!(a as u32, b as u32)
}

/// 64-bit comparison by unsigned magnitude
#[inline]
pub fn compare_unsigned_i64(a: i64, b: i64) -> i32 {
    three_way!(a as u64, b as u64)
}

/// Truncating remainder `a - trunc(a / b) * b`
///
/// The sign follows `a`. Division by zero and non-finite operands flow
/// through the division unchanged (NaN or infinity).
#[inline]
pub fn remainder_f32(a: f32, b: f32) -> f32 {
    a - (a / b).trunc() * b
}

/// Truncating remainder `a - trunc(a / b) * b`
#[inline]
pub fn remainder_f64(a: f64, b: f64) -> f64 {
    a - (a / b).trunc() * b
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTS: [i64; 9] = [i64::MIN, -1_000_000, -2, -1, 0, 1, 2, 1_000_000, i64::MAX];
    const DOUBLES: [f64; 9] = [
        f64::NEG_INFINITY,
        -1.0e300,
        -2.5,
        -0.0,
        0.0,
        1.0e-300,
        2.5,
        1.0e300,
        f64::INFINITY,
    ];

    #[test]
    fn test_compare_i32() {
        assert_eq!(compare_i32(3, 2), 1);
        assert_eq!(compare_i32(2, 3), -1);
        assert_eq!(compare_i32(7, 7), 0);
        assert_eq!(compare_i32(i32::MIN, i32::MAX), -1);
        assert_eq!(compare_i32(-1, 0), -1);
    }

    #[test]
    fn test_compare_unsigned() {
        // -1 is the largest unsigned value
        assert_eq!(compare_unsigned_i32(-1, 0), 1);
        assert_eq!(compare_unsigned_i32(0, -1), -1);
        assert_eq!(compare_unsigned_i32(i32::MIN, i32::MAX), 1);
        assert_eq!(compare_unsigned_i32(5, 5), 0);
        assert_eq!(compare_unsigned_i64(-1, 1), 1);
        assert_eq!(compare_unsigned_i64(i64::MIN, i64::MAX), 1);
        assert_eq!(compare_unsigned_i64(1, 2), -1);
    }

    #[test]
    fn test_integer_antisymmetry() {
        for &a in &INTS {
            for &b in &INTS {
                let r = compare_i64(a, b);
                assert!((-1..=1).contains(&r));
                assert_eq!(r, -compare_i64(b, a));
                assert_eq!(compare_unsigned_i64(a, b), -compare_unsigned_i64(b, a));
                assert_eq!(compare_i32(a as i32, b as i32), -compare_i32(b as i32, a as i32));
            }
        }
    }

    #[test]
    fn test_float_antisymmetry() {
        for &a in &DOUBLES {
            for &b in &DOUBLES {
                assert_eq!(compare_f64(a, b), -compare_f64(b, a));
                let (fa, fb) = (a as f32, b as f32);
                assert_eq!(compare_f32(fa, fb), -compare_f32(fb, fa));
            }
        }
    }

    #[test]
    fn test_signed_zero_is_equal() {
        assert_eq!(compare_f64(-0.0, 0.0), 0);
        assert_eq!(compare_f32(0.0, -0.0), 0);
    }

    #[test]
    fn test_nan_compares_equal() {
        for &x in &DOUBLES {
            assert_eq!(compare_f64(f64::NAN, x), 0);
            assert_eq!(compare_f64(x, f64::NAN), 0);
            assert_eq!(compare_f32(f32::NAN, x as f32), 0);
            assert_eq!(compare_f32(x as f32, f32::NAN), 0);
        }
        assert_eq!(compare_f64(f64::NAN, f64::NAN), 0);
    }

    #[test]
    fn test_remainder() {
        assert_eq!(remainder_f64(7.5, 2.0), 1.5);
        assert_eq!(remainder_f64(-7.5, 2.0), -1.5);
        assert_eq!(remainder_f64(7.5, -2.0), 1.5);
        assert_eq!(remainder_f32(7.5, 2.0), 1.5);
        assert_eq!(remainder_f32(-7.5, 2.0), -1.5);
        assert_eq!(remainder_f64(6.0, 3.0), 0.0);
    }

    #[test]
    fn test_remainder_matches_native() {
        let pairs: [(f64, f64); 7] = [
            (10.0, 3.0),
            (-10.0, 3.0),
            (10.0, -3.0),
            (5.25, 0.5),
            (1.0e6, 7.0),
            (-12.75, 2.5),
            (0.3, 0.1),
        ];
        for (a, b) in pairs {
            let expected = a % b;
            let actual = remainder_f64(a, b);
            assert!(
                (expected - actual).abs() <= f64::EPSILON * a.abs().max(1.0),
                "{a} % {b}: {actual} vs {expected}"
            );
            assert!(actual == 0.0 || actual.signum() == a.signum());
        }
    }

    #[test]
    fn test_remainder_special_values() {
        assert!(remainder_f64(1.0, 0.0).is_nan());
        assert!(remainder_f64(f64::INFINITY, 2.0).is_nan());
        assert!(remainder_f64(f64::NAN, 2.0).is_nan());
        assert!(remainder_f32(1.0, 0.0).is_nan());
        assert!(remainder_f32(2.0, f32::NAN).is_nan());
    }
}
