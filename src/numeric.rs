//! Numerically stable helpers shared by entropy and dominance code.
use std::f64;


/// Values below this are rescaled by `UNDERFLOW_RESCALE` before they
/// flush to zero.
pub const UNDERFLOW_THRESHOLD: f64 = 1e-75;
pub const UNDERFLOW_RESCALE: f64 = 1e75;

/// Stable `log(exp(a) + exp(b))`, using the shifted-max form
/// `max(a, b) + log(1 + exp(-|a - b|))`.
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a == f64::INFINITY || b == f64::INFINITY {
        return f64::INFINITY;
    }
    a.max(b) + (-(a - b).abs()).exp().ln_1p()
}

/// Multiplies every value by `UNDERFLOW_RESCALE` if all of them are
/// below `UNDERFLOW_THRESHOLD`. Relative order is unchanged.
///
/// Returns true if a rescale took place.
pub fn rescale_underflow(values: &mut [f64]) -> bool {
    if values.is_empty() || values.iter().any(|&v| v >= UNDERFLOW_THRESHOLD) {
        return false;
    }
    for v in values.iter_mut() {
        *v *= UNDERFLOW_RESCALE;
    }
    true
}

/// Shannon entropy (bits) of the distribution proportional to `weights`.
///
/// Zero weights contribute nothing; an all-zero vector has entropy 0.
pub fn shannon_entropy(weights: &[f64]) -> f64 {
    let total = weights.iter().sum::<f64>();
    if !(total > 0.) {
        return 0.;
    }
    let h = weights.iter()
                   .filter(|&&w| w > 0.)
                   .map(|&w| {
                       let p = w / total;
                       -p * p.log2()
                   })
                   .sum::<f64>();
    // Rounding can leave a tiny negative value for point masses.
    h.max(0.)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn log_add_exp_basic() {
        assert!(approx_eq(log_add_exp(0., 0.), 2f64.ln(), 1e-12));
        assert!(approx_eq(log_add_exp(-1000., 0.), 0., 1e-12));
        assert!(log_add_exp(f64::NEG_INFINITY, 2.) == 2.);
        assert!(log_add_exp(f64::INFINITY, 2.) == f64::INFINITY);
        assert!(log_add_exp(f64::NAN, 2.).is_nan());
    }

    /// No overflow where the naive formula would overflow.
    #[test]
    fn log_add_exp_large() {
        let out = log_add_exp(800., 800.);
        assert!(approx_eq(out, 800. + 2f64.ln(), 1e-9));
    }

    #[test]
    fn rescale() {
        let mut v = [1e-80, 3e-90];
        assert!(rescale_underflow(&mut v));
        assert!(approx_eq(v[0], 1e-5, 1e-18));
        assert!(v[0] > v[1]);

        let mut w = [1e-80, 1e-3];
        assert!(!rescale_underflow(&mut w));
        assert!(w == [1e-80, 1e-3]);
    }

    #[test]
    fn entropy() {
        assert!(shannon_entropy(&[0., 0.]) == 0.);
        assert!(shannon_entropy(&[5., 0., 0.]) == 0.);
        assert!(approx_eq(shannon_entropy(&[1., 1.]), 1., 1e-12));
        assert!(approx_eq(shannon_entropy(&[2., 2., 2., 2.]), 2., 1e-12));
    }
}
