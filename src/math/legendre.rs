//! Legendre polynomials `P_k(x)`.
//!
//! Low orders (0–5) use the explicit closed forms, which are slightly more
//! accurate than running the recurrence. From order 6 onward we continue with
//! Bonnet's recurrence:
//!
//! ```text
//! (k + 1) P_{k+1}(x) = (2k + 1) x P_k(x) - k P_{k-1}(x)
//! ```

/// Highest order evaluated in closed form.
const CLOSED_FORM_MAX: usize = 5;

/// `P_k(x)` for a single order.
pub fn legendre(k: usize, x: f64) -> f64 {
    match k {
        0 => 1.0,
        1 => x,
        2 => 0.5 * (3.0 * x * x - 1.0),
        3 => 0.5 * x * (5.0 * x * x - 3.0),
        4 => {
            let x2 = x * x;
            0.125 * (35.0 * x2 * x2 - 30.0 * x2 + 3.0)
        }
        5 => {
            let x2 = x * x;
            0.125 * x * (63.0 * x2 * x2 - 70.0 * x2 + 15.0)
        }
        _ => *legendre_basis(x, k).last().unwrap_or(&0.0),
    }
}

/// `[P_0(x), ..., P_order(x)]`.
pub fn legendre_basis(x: f64, order: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(order + 1);
    for k in 0..=order.min(CLOSED_FORM_MAX) {
        out.push(legendre(k, x));
    }
    for k in CLOSED_FORM_MAX..order {
        let kf = k as f64;
        let next = ((2.0 * kf + 1.0) * x * out[k] - kf * out[k - 1]) / (kf + 1.0);
        out.push(next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference values straight from the recurrence, seeded with P0 = 1, P1 = x.
    fn by_recurrence(x: f64, order: usize) -> Vec<f64> {
        let mut p = vec![1.0, x];
        for k in 1..order {
            let kf = k as f64;
            p.push(((2.0 * kf + 1.0) * x * p[k] - kf * p[k - 1]) / (kf + 1.0));
        }
        p.truncate(order + 1);
        p
    }

    #[test]
    fn closed_forms_match_recurrence() {
        for &x in &[-1.0, -0.7, -0.2, 0.0, 0.3, 0.9, 1.0, 1.7] {
            let a = legendre_basis(x, 9);
            let b = by_recurrence(x, 9);
            for (k, (pa, pb)) in a.iter().zip(b.iter()).enumerate() {
                assert!((pa - pb).abs() < 1e-12, "P{k}({x}): {pa} vs {pb}");
            }
        }
    }

    #[test]
    fn endpoints_follow_parity() {
        for k in 0..12 {
            assert!((legendre(k, 1.0) - 1.0).abs() < 1e-12);
            let expected = if k % 2 == 0 { 1.0 } else { -1.0 };
            assert!((legendre(k, -1.0) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn basis_length_is_order_plus_one() {
        assert_eq!(legendre_basis(0.5, 0), vec![1.0]);
        assert_eq!(legendre_basis(0.5, 3).len(), 4);
        assert_eq!(legendre_basis(0.5, 8).len(), 9);
    }
}
