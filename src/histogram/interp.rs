//! Monotone piecewise cubic Hermite interpolation (PCHIP).
//!
//! Knot derivatives follow Fritsch–Butland: a weighted harmonic mean of the
//! neighbouring secant slopes, forced to zero at local extrema, with a
//! one-sided three-point estimate at the ends. The interpolant never leaves
//! the range of the two bracketing samples, so a spike between empty bins
//! cannot ring into negative values the way a natural spline does.

/// Fitted interpolant over strictly increasing knots.
#[derive(Debug, Clone)]
pub struct Pchip {
    x: Vec<f64>,
    y: Vec<f64>,
    d: Vec<f64>,
}

impl Pchip {
    /// Fit through `(x, y)`.
    ///
    /// Returns `None` when the lengths differ, no knot is given,
    /// or `x` is not strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        if x.len() != y.len() || x.is_empty() {
            return None;
        }
        if x.windows(2).any(|w| w[1] <= w[0] || w[1].is_nan() || w[0].is_nan()) {
            return None;
        }

        let d = knot_slopes(x, y);
        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            d,
        })
    }

    /// Evaluate at `xq`; queries outside the knot range are clamped to it.
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }

        let xq = xq.clamp(self.x[0], self.x[n - 1]);
        // Interval k with x[k] <= xq <= x[k + 1].
        let k = self.x.partition_point(|&xk| xk <= xq).clamp(1, n - 1) - 1;

        let h = self.x[k + 1] - self.x[k];
        let t = (xq - self.x[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.y[k] + h10 * h * self.d[k] + h01 * self.y[k + 1] + h11 * h * self.d[k + 1]
    }

    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

fn knot_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 1 {
        return vec![0.0];
    }

    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = y
        .windows(2)
        .zip(&h)
        .map(|(w, &hk)| (w[1] - w[0]) / hk)
        .collect();

    // Two knots: the straight line is the only monotone choice.
    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (m[k - 1], m[k]);
        if m0 * m1 <= 0.0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = end_slope(h[0], h[1], m[0], m[1]);
    d[n - 1] = end_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// Shape-preserving one-sided three-point estimate.
fn end_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

/// Sign with zero mapped to zero (unlike `f64::signum`).
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_passes_through_knots() {
        let x = [1.0, 2.0, 4.0, 8.0, 9.0];
        let y = [0.0, 3.0, 1.0, 5.0, 5.0];
        let p = Pchip::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert_relative_eq!(p.eval(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spike_does_not_undershoot() {
        let x = [2.0, 3.9, 7.7, 15.4, 30.0];
        let y = [0.0, 0.0, 1.0, 0.0, 0.0];
        let p = Pchip::new(&x, &y).unwrap();
        for xq in linspace(2.0, 30.0, 500) {
            let v = p.eval(xq);
            assert!((0.0..=1.0).contains(&v), "overshoot {v} at {xq}");
        }
    }

    #[test]
    fn test_monotone_data_stays_monotone() {
        let x = [0.0, 1.0, 1.5, 4.0, 10.0];
        let y = [0.0, 0.1, 3.0, 3.1, 9.0];
        let p = Pchip::new(&x, &y).unwrap();
        let vals = p.eval_many(&linspace(0.0, 10.0, 400));
        assert!(vals.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    }

    #[test]
    fn test_reproduces_linear_data() {
        let x = [1.0, 2.0, 5.0, 6.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let p = Pchip::new(&x, &y).unwrap();
        assert_relative_eq!(p.eval(3.3), 8.9, epsilon = 1e-12);
    }

    #[test]
    fn test_two_and_one_knot() {
        let p = Pchip::new(&[0.0, 2.0], &[1.0, 3.0]).unwrap();
        assert_relative_eq!(p.eval(0.5), 1.5);
        assert_relative_eq!(p.eval(-5.0), 1.0);

        let flat = Pchip::new(&[4.0], &[2.5]).unwrap();
        assert_eq!(flat.eval(100.0), 2.5);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(Pchip::new(&[], &[]).is_none());
        assert!(Pchip::new(&[0.0, 1.0], &[1.0]).is_none());
        assert!(Pchip::new(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
