// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Plain exponential recurrence, seeded with the first value:
//
//   ema[0] = values[0]
//   ema[i] = alpha * values[i] + (1 - alpha) * ema[i-1]
//
// Weights of past observations decay geometrically with no bias-correction
// normalization. Defined from index 0, so the output carries no NaN prefix.
// The span form derives alpha = 2 / (span + 1).

/// EMA of `values` with smoothing factor `alpha`.
///
/// Aligned to the input and fully defined from index 0. An `alpha` outside
/// (0, 1] yields an all-NaN sequence.
pub fn ema(values: &[f64], alpha: f64) -> Vec<f64> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return vec![f64::NAN; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut prev = match values.first() {
        Some(&v) => v,
        None => return out,
    };
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Span-parameterized EMA: `alpha = 2 / (span + 1)`.
pub fn ema_span(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    ema(values, 2.0 / (span as f64 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_fixed_vector() {
        // alpha = 0.5 over [10, 12, 11, 13, 15] => [10, 11, 11, 12, 13.5]
        let result = ema(&[10.0, 12.0, 11.0, 13.0, 15.0], 0.5);
        let expected = [10.0, 11.0, 11.0, 12.0, 13.5];
        assert_eq!(result.len(), expected.len());
        for (a, b) in result.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-12, "{a} != {b}");
        }
    }

    #[test]
    fn ema_recurrence_reproducibility() {
        // Direct recomputation of the recurrence for an arbitrary alpha.
        let values = [3.0, 7.0, 2.0, 9.0, 4.0, 6.0];
        let alpha = 0.3;
        let result = ema(&values, alpha);

        let mut expected = values[0];
        assert_eq!(result[0], expected);
        for i in 1..values.len() {
            expected = alpha * values[i] + (1.0 - alpha) * expected;
            assert!((result[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_alpha_one_is_identity() {
        let values = [4.0, 8.0, 1.0];
        assert_eq!(ema(&values, 1.0), values.to_vec());
    }

    #[test]
    fn ema_span_alpha() {
        // span 3 => alpha = 0.5, same as the fixed vector above.
        let result = ema_span(&[10.0, 12.0, 11.0, 13.0, 15.0], 3);
        assert!((result[4] - 13.5).abs() < 1e-12);
    }

    #[test]
    fn ema_no_nan_prefix() {
        let result = ema_span(&[5.0, 6.0, 7.0], 10);
        assert!(result.iter().all(|v| v.is_finite()));
        assert_eq!(result[0], 5.0);
    }

    #[test]
    fn ema_invalid_alpha_is_all_nan() {
        assert!(ema(&[1.0, 2.0], 0.0).iter().all(|v| v.is_nan()));
        assert!(ema(&[1.0, 2.0], 1.5).iter().all(|v| v.is_nan()));
        assert!(ema_span(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 0.5).is_empty());
    }
}
