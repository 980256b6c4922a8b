//! Objective functions optimized by the trainer
//!
//! An objective function is a parametric model `f(x; θ)` that owns its
//! current parameter vector. The trainer sets θ, then asks for predictions
//! and for the derivative of every prediction with respect to every
//! parameter. Derivatives are supplied by the model itself; there is no
//! automatic differentiation.

/// Parametric model consumed by [`crate::trainer::Trainer`].
///
/// Evaluations always use the parameters most recently passed to
/// [`ObjectiveFunction::set_parameters`].
pub trait ObjectiveFunction {
    /// Current parameter vector. Its length is the model's parameter count.
    fn parameters(&self) -> &[f64];

    /// Replace the parameter vector.
    fn set_parameters(&mut self, parameters: &[f64]);

    /// Evaluate the model on every input: `fx[i] = f(x[i])`.
    fn function(&self, x: &[f64]) -> Vec<f64>;

    /// Parameter derivatives, indexed `[sample][parameter]`:
    /// `d[i][j] = ∂f(x[i]) / ∂θ[j]`.
    fn derivative_parameters(&self, x: &[f64]) -> Vec<Vec<f64>>;

    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }
}

/// Polynomial in one variable.
///
/// Coefficients are stored highest degree first, so for `θ = [a, b, c]` the
/// model is `f(x) = a·x² + b·x + c`.
///
/// # Example
///
/// ```
/// use rust_gradient_descent::objective::{ObjectiveFunction, Polynomial};
///
/// let line = Polynomial::linear(2.0, 1.0);
/// assert_eq!(line.function(&[0.0, 1.0, 2.0]), vec![1.0, 3.0, 5.0]);
/// assert_eq!(line.derivative_parameters(&[3.0]), vec![vec![3.0, 1.0]]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Polynomial with the given coefficients, highest degree first.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Polynomial of `degree` with every coefficient set to 1.
    pub fn with_degree(degree: usize) -> Self {
        Self::new(vec![1.0; degree + 1])
    }

    /// `f(x) = slope·x + intercept`.
    pub fn linear(slope: f64, intercept: f64) -> Self {
        Self::new(vec![slope, intercept])
    }

    /// Highest power of `x`; 0 for a constant.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluate at a single point (Horner's scheme).
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients.iter().fold(0.0, |acc, c| acc * x + c)
    }
}

impl ObjectiveFunction for Polynomial {
    fn parameters(&self) -> &[f64] {
        &self.coefficients
    }

    fn set_parameters(&mut self, parameters: &[f64]) {
        self.coefficients.clear();
        self.coefficients.extend_from_slice(parameters);
    }

    fn function(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.evaluate(xi)).collect()
    }

    fn derivative_parameters(&self, x: &[f64]) -> Vec<Vec<f64>> {
        let degree = self.degree() as i32;
        x.iter()
            .map(|&xi| {
                (0..self.coefficients.len() as i32)
                    .map(|j| xi.powi(degree - j))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_evaluation() {
        let poly = Polynomial::new(vec![1.0, -2.0, 3.0]);
        assert_eq!(poly.degree(), 2);
        assert_eq!(poly.function(&[0.0, 1.0, 2.0]), vec![3.0, 2.0, 3.0]);
    }

    #[test]
    fn test_quadratic_derivatives() {
        let poly = Polynomial::with_degree(2);
        assert_eq!(
            poly.derivative_parameters(&[2.0, -1.0]),
            vec![vec![4.0, 2.0, 1.0], vec![1.0, -1.0, 1.0]]
        );
    }

    #[test]
    fn test_set_parameters() {
        let mut poly = Polynomial::with_degree(1);
        poly.set_parameters(&[2.0, 1.0]);
        assert_eq!(poly.parameters(), &[2.0, 1.0]);
        assert_eq!(poly.parameter_count(), 2);
        assert_eq!(poly.evaluate(4.0), 9.0);
    }
}
