/// Expected-cardinality model
///
/// Predicts how many distinct combinations a column pair "should" produce if
/// the two sides were independent, so the run can tell which observed
/// cardinalities are surprising.

/// Expected number of distinct combinations when drawing `row_count` rows
/// from a domain of `a * b` equally likely combinations: the occupied-bins
/// count of the classic urn experiment,
/// `d * (1 - (1 - 1/d)^R)` with `d = a * b`.
///
/// The result never exceeds `row_count` or `a * b`, is non-decreasing in
/// both cardinalities, and collapses to 0 on an empty stream.
pub fn joint_cardinality(row_count: f64, a: f64, b: f64) -> f64 {
    let domain = a * b;
    if row_count <= 0.0 || domain <= 0.0 {
        return 0.0;
    }
    domain * (1.0 - (1.0 - 1.0 / domain).powf(row_count))
}

/// Relative gap between predicted and observed cardinality:
/// `(expected - observed) / max(expected, observed)`, 0 when both are 0.
/// Positive surprise means the combination is less varied than independence
/// predicts.
pub fn surprise(expected: f64, observed: f64) -> f64 {
    let max = expected.max(observed);
    if max > 0.0 {
        (expected - observed) / max
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_cardinality_reproduces_scott_pair() {
        // Two 3-valued columns over 14 rows; the constant is fixed by the
        // reference outputs for the DEPTNO/DNAME pair.
        let expected = joint_cardinality(14.0, 3.0, 3.0);
        assert!((expected - 7.269756624410332).abs() < 1e-9);
    }

    #[test]
    fn test_joint_cardinality_is_capped() {
        for &(r, a, b) in &[(14.0, 3.0, 3.0), (100.0, 10.0, 50.0), (5.0, 2.0, 2.0)] {
            let e = joint_cardinality(r, a, b);
            assert!(e <= r + 1e-9);
            assert!(e <= a * b + 1e-9);
            assert!(e >= 0.0);
        }
    }

    #[test]
    fn test_joint_cardinality_monotone_in_domain() {
        let low = joint_cardinality(100.0, 3.0, 4.0);
        let high = joint_cardinality(100.0, 3.0, 8.0);
        assert!(high > low);
    }

    #[test]
    fn test_joint_cardinality_degenerate_inputs() {
        assert_eq!(joint_cardinality(0.0, 3.0, 4.0), 0.0);
        assert_eq!(joint_cardinality(10.0, 0.0, 4.0), 0.0);
        // A 1x1 domain always yields exactly one combination.
        assert!((joint_cardinality(10.0, 1.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_surprise_range_and_sign() {
        assert_eq!(surprise(0.0, 0.0), 0.0);
        assert_eq!(surprise(14.0, 14.0), 0.0);
        let positive = surprise(14.0, 3.0);
        assert!((positive - 11.0 / 14.0).abs() < 1e-12);
        assert!(surprise(3.0, 14.0) < 0.0);
        assert!(surprise(14.0, 0.0) <= 1.0);
    }
}
