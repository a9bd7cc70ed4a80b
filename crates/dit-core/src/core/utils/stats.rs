pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N, not N - 1).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

/// Inverse CDF of the standard normal distribution (Acklam's rational
/// approximation, relative error below 1.2e-9). `p` must lie in (0, 1);
/// anything else yields NaN.
pub fn normal_ppf(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) || p == 0.0 || p == 1.0 {
        return f64::NAN;
    }

    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{a} vs {b}");
    }

    #[test]
    fn mean_and_population_std() {
        let values = [0.0, 10.0, 20.0, 30.0];
        assert_close(mean(&values), 15.0, 1e-12);
        assert_close(population_std(&values), 11.180339887498949, 1e-9);
    }

    #[test]
    fn empty_slices_yield_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
    }

    #[test]
    fn rounding_to_digits() {
        assert_close(round_to(0.123456, 4), 0.1235, 1e-12);
        assert_close(round_to(-1.55, 1), -1.6, 1e-12);
    }

    #[test]
    fn ppf_matches_reference_quantiles() {
        assert_close(normal_ppf(0.5), 0.0, 1e-9);
        assert_close(normal_ppf(0.975), 1.959963985, 1e-7);
        assert_close(normal_ppf(0.90), 1.281551566, 1e-7);
        assert_close(normal_ppf(0.025), -1.959963985, 1e-7);
        assert_close(normal_ppf(0.001), -3.090232306, 1e-6);
    }

    #[test]
    fn ppf_is_nan_outside_open_interval() {
        assert!(normal_ppf(0.0).is_nan());
        assert!(normal_ppf(1.0).is_nan());
        assert!(normal_ppf(-0.5).is_nan());
    }
}
