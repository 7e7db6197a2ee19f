//! Numeric statistics: descriptive measures, Welch's two-sample t-test and
//! family-wise p-value correction.
//!
//! The Student-t tail probability is computed from the regularized
//! incomplete beta function (Lentz's continued fraction), so no external
//! numerics crate is needed.

/// Arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator) given a pre-computed mean.
/// Callers must guarantee at least two observations.
pub fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Standard error of the mean: sd / sqrt(n).
pub fn standard_error(stddev: f64, n: usize) -> f64 {
    stddev / (n as f64).sqrt()
}

/// Rounds to 3 decimal places. Presentation only; statistics are carried at
/// full precision everywhere else.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Welch's two-sample t-test for populations with unequal variances.
///
/// Returns (t statistic, Welch–Satterthwaite effective degrees of freedom,
/// two-sided p-value). Both samples need at least two observations.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> (f64, f64, f64) {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (mean(a), mean(b));
    let va = a.iter().map(|v| (v - ma).powi(2)).sum::<f64>() / (na - 1.0);
    let vb = b.iter().map(|v| (v - mb).powi(2)).sum::<f64>() / (nb - 1.0);

    let se2 = va / na + vb / nb;
    let t = (ma - mb) / se2.sqrt();
    let df = se2.powi(2) / ((va / na).powi(2) / (na - 1.0) + (vb / nb).powi(2) / (nb - 1.0));

    (t, df, students_t_two_sided(t, df))
}

/// Two-sided p-value P(|T| ≥ |t|) for a t statistic with `df` degrees of
/// freedom, via the identity P = I_x(df/2, 1/2) with x = df / (df + t²).
pub fn students_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() || !df.is_finite() || df <= 0.0 {
        return f64::NAN;
    }
    if t == 0.0 {
        return 1.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Bonferroni family-wise correction: p_adj = min(1, p × m), where m is the
/// size of the entire family of simultaneous tests. The caller must collect
/// the whole family before calling; m is a property of the run, not of a
/// single test.
pub fn bonferroni(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len() as f64;
    p_values.iter().map(|p| (p * m).min(1.0)).collect()
}

/// Regularized incomplete beta function I_x(a, b).
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let front =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    // The continued fraction converges fastest below the symmetry point.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Lentz's continued fraction for the incomplete beta function.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-14;
    const FPMIN: f64 = 1.0e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Lanczos approximation of ln Γ(x) for x > 0.
fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];

    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut y = x;
    let mut ser = 1.000_000_000_190_015;
    for c in COEF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn descriptive_measures_match_reference_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let m = mean(&values);
        let sd = sample_stddev(&values, m);
        let se = standard_error(sd, values.len());

        assert!(close(m, 3.0, 1e-12));
        assert!(close(sd, 1.5811, 1e-4));
        assert!(close(se, 0.7071, 1e-4));
    }

    #[test]
    fn round3_rounds_to_three_decimals() {
        assert_eq!(round3(1.58113883), 1.581);
        assert_eq!(round3(0.34656), 0.347);
        assert_eq!(round3(-2.71828), -2.718);
    }

    #[test]
    fn ln_gamma_matches_known_values() {
        // Γ(1) = Γ(2) = 1, Γ(5) = 24
        assert!(close(ln_gamma(1.0), 0.0, 1e-10));
        assert!(close(ln_gamma(2.0), 0.0, 1e-10));
        assert!(close(ln_gamma(5.0), 24.0f64.ln(), 1e-10));
    }

    #[test]
    fn t_distribution_tail_matches_tables() {
        // Standard two-sided critical values: t = 2.228, df = 10 → p ≈ 0.05
        assert!(close(students_t_two_sided(2.228, 10.0), 0.05, 1e-3));
        // t = 1.0, df = 8 → p ≈ 0.3466
        assert!(close(students_t_two_sided(1.0, 8.0), 0.3466, 1e-3));
        // Sign of t must not matter
        assert!(close(
            students_t_two_sided(-1.7, 12.0),
            students_t_two_sided(1.7, 12.0),
            1e-12
        ));
        assert_eq!(students_t_two_sided(0.0, 7.0), 1.0);
    }

    #[test]
    fn welch_test_on_shifted_samples() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 3.0, 4.0, 5.0, 6.0];
        let (t, df, p) = welch_t_test(&a, &b);

        // Equal variances and sizes: se² = 1.0, t = -1.0, df = 8
        assert!(close(t, -1.0, 1e-12));
        assert!(close(df, 8.0, 1e-9));
        assert!(close(p, 0.3466, 1e-3));
    }

    #[test]
    fn welch_test_identical_samples_is_insignificant() {
        let a = [3.0, 4.0, 5.0, 6.0];
        let (t, _, p) = welch_t_test(&a, &a);
        assert!(close(t, 0.0, 1e-12));
        assert_eq!(p, 1.0);
    }

    #[test]
    fn bonferroni_scales_and_caps() {
        let adjusted = bonferroni(&[0.01, 0.04, 0.2]);
        assert!(close(adjusted[0], 0.03, 1e-12));
        assert!(close(adjusted[1], 0.12, 1e-12));
        assert!(close(adjusted[2], 0.6, 1e-12));

        let capped = bonferroni(&[0.4, 0.9]);
        assert!(close(capped[0], 0.8, 1e-12));
        assert_eq!(capped[1], 1.0);
    }

    #[test]
    fn bonferroni_never_lowers_a_p_value() {
        let raw = [0.001, 0.02, 0.3, 0.77, 1.0];
        for (adj, p) in bonferroni(&raw).iter().zip(raw) {
            assert!(*adj >= p);
        }
    }
}
