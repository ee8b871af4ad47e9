//! Gaussian line profile.

/// `amplitude · exp(-0.5 ((x - center) / sigma)^2)`.
pub fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    let u = (x - center) / sigma;
    amplitude * (-0.5 * u * u).exp()
}
