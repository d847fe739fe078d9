//! Burg-method linear prediction and pole extraction.
//!
//! The formant pass models each windowed frame as an all-pole filter; the
//! reflection-coefficient recursion below estimates the filter, and the
//! polynomial roots of the prediction error filter give one resonance
//! (frequency + bandwidth) per conjugate pole pair.

use nalgebra::DMatrix;
use num_complex::Complex;
use std::f64::consts::PI;

/// LPC coefficients a[0..order-1] for the error filter
/// A(z) = 1 - a[0]·z⁻¹ - … - a[order-1]·z⁻ᵒʳᵈᵉʳ, plus the residual power.
#[derive(Debug, Clone)]
pub struct BurgModel {
    pub coefficients: Vec<f64>,
    pub residual: f64,
}

/// Estimate LPC coefficients with Burg's method.
///
/// Returns None when the frame carries no energy at all, in which case no
/// meaningful filter exists.
pub fn burg(samples: &[f64], order: usize) -> Option<BurgModel> {
    let n = samples.len();
    if n <= order || order == 0 {
        return None;
    }

    let mut a = vec![0.0; order];
    let mut power: f64 = samples.iter().map(|&x| x * x).sum::<f64>() / n as f64;
    if power <= 0.0 {
        return None;
    }

    // Forward and backward prediction error sequences.
    let mut fwd = vec![0.0; n];
    let mut bwd = vec![0.0; n];
    fwd[0] = samples[0];
    bwd[n - 2] = samples[n - 1];
    for j in 1..n - 1 {
        fwd[j] = samples[j];
        bwd[j - 1] = samples[j];
    }

    let mut previous = vec![0.0; order];

    for i in 0..order {
        let mut num = 0.0;
        let mut den = 0.0;
        for j in 0..n - i - 1 {
            num += fwd[j] * bwd[j];
            den += fwd[j] * fwd[j] + bwd[j] * bwd[j];
        }
        if den <= 0.0 {
            return Some(BurgModel {
                coefficients: a,
                residual: 0.0,
            });
        }

        a[i] = 2.0 * num / den;
        power *= 1.0 - a[i] * a[i];

        for j in 0..i {
            a[j] = previous[j] - a[i] * previous[i - j - 1];
        }

        if i < order - 1 {
            previous[..=i].copy_from_slice(&a[..=i]);
            for j in 0..n - i - 2 {
                fwd[j] -= previous[i] * bwd[j];
                bwd[j] = bwd[j + 1] - previous[i] * fwd[j + 1];
            }
        }
    }

    Some(BurgModel {
        coefficients: a,
        residual: power,
    })
}

/// A resonance candidate recovered from one pole pair.
#[derive(Debug, Clone, Copy)]
pub struct Resonance {
    /// Frequency in Hz
    pub frequency: f64,
    /// Bandwidth in Hz
    pub bandwidth: f64,
}

/// Convert an LPC model to resonance candidates, sorted by frequency.
///
/// Roots outside the unit circle are reflected inside (they describe the
/// same spectrum with positive bandwidth); only roots in the upper half
/// plane and at least 50 Hz clear of DC and Nyquist survive.
pub fn resonances(model: &BurgModel, sample_rate: f64) -> Vec<Resonance> {
    let m = model.coefficients.len();
    if m == 0 {
        return Vec::new();
    }
    let nyquist = sample_rate / 2.0;

    // Error-filter polynomial, constant term first:
    // -a[m-1], …, -a[0], 1.
    let mut poly = vec![0.0; m + 1];
    for i in 0..m {
        poly[i] = -model.coefficients[m - 1 - i];
    }
    poly[m] = 1.0;

    let mut roots = companion_roots(&poly);
    for root in &mut roots {
        polish_root(&poly, root);
        let magnitude = root.norm();
        if magnitude > 1.0 {
            *root /= magnitude * magnitude;
        }
    }

    let margin = 50.0;
    let mut found: Vec<Resonance> = roots
        .iter()
        .filter(|root| root.im >= 0.0)
        .filter_map(|root| {
            let frequency = root.im.atan2(root.re).abs() * nyquist / PI;
            if frequency < margin || frequency > nyquist - margin {
                return None;
            }
            let magnitude = root.norm();
            let bandwidth = if magnitude > 0.0 {
                -magnitude.ln() * nyquist / PI
            } else {
                nyquist
            };
            Some(Resonance {
                frequency,
                bandwidth,
            })
        })
        .collect();

    found.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
    found
}

/// Roots of a real polynomial (constant term first) via the eigenvalues of
/// its companion matrix.
fn companion_roots(coefficients: &[f64]) -> Vec<Complex<f64>> {
    let degree = coefficients.len() - 1;
    if degree == 0 {
        return Vec::new();
    }

    let leading = coefficients[degree];
    if leading.abs() < 1e-15 {
        return companion_roots(&coefficients[..degree]);
    }
    let normalized: Vec<f64> = coefficients.iter().map(|&c| c / leading).collect();

    if degree == 1 {
        return vec![Complex::new(-normalized[0], 0.0)];
    }

    let mut companion = DMatrix::<f64>::zeros(degree, degree);
    for i in 1..degree {
        companion[(i, i - 1)] = 1.0;
    }
    for i in 0..degree {
        companion[(i, degree - 1)] = -normalized[i];
    }

    companion
        .complex_eigenvalues()
        .iter()
        .map(|c| Complex::new(c.re, c.im))
        .collect()
}

/// A few Newton-Raphson steps to tighten an eigenvalue-derived root.
fn polish_root(coefficients: &[f64], root: &mut Complex<f64>) {
    const MAX_ITER: usize = 40;

    let mut best = *root;
    let mut best_residual = f64::MAX;

    for _ in 0..MAX_ITER {
        let (value, derivative) = horner_with_derivative(coefficients, *root);
        let residual = value.norm();
        if residual >= best_residual {
            break;
        }
        best_residual = residual;
        best = *root;
        if derivative.norm() == 0.0 {
            break;
        }
        *root -= value / derivative;
    }

    *root = best;
}

fn horner_with_derivative(
    coefficients: &[f64],
    z: Complex<f64>,
) -> (Complex<f64>, Complex<f64>) {
    let n = coefficients.len();
    let mut value = Complex::new(coefficients[n - 1], 0.0);
    let mut derivative = Complex::new(0.0, 0.0);
    for &c in coefficients[..n - 1].iter().rev() {
        derivative = derivative * z + value;
        value = value * z + c;
    }
    (value, derivative)
}
