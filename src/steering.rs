// src/steering.rs - Steering angle to servo duty conversion

/// Polynomial model mapping a steering angle (degrees) to a PWM duty value.
///
/// Coefficients are supplied highest degree first (`k0 * a^n + ... + kn`),
/// so the last coefficient is the constant term. The angle is expected to be
/// clamped by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringModel {
    coefficients: Vec<f64>,
}

impl SteeringModel {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn duty(&self, angle: f64) -> f64 {
        evaluate(angle, &self.coefficients)
    }
}

/// Evaluate `coefficients` (descending degree) at `angle`. Empty yields 0.
pub fn evaluate(angle: f64, coefficients: &[f64]) -> f64 {
    coefficients
        .iter()
        .rev()
        .enumerate()
        .map(|(exponent, coefficient)| coefficient * angle.powi(exponent as i32))
        .sum()
}
