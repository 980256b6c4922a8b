//! Incremental mean with constant memory.

/// Running arithmetic mean that skips non-finite samples.
///
/// The mean is updated in place as `mean = mean * n / (n + 1) + x / (n + 1)`,
/// so no sample history is kept. `NaN` and infinite values leave both the
/// mean and the count untouched.
///
/// # Example
///
/// ```
/// use rust_gradient_descent::utils::CumulativeAverage;
///
/// let mut average = CumulativeAverage::new();
/// average.add(1.0);
/// average.add(f64::NAN);
/// average.add(3.0);
///
/// assert_eq!(average.mean(), 2.0);
/// assert_eq!(average.count(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CumulativeAverage {
    mean: f64,
    count: usize,
}

impl CumulativeAverage {
    /// Create an empty accumulator (mean 0, count 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample and return the updated mean.
    pub fn add(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            if self.count == 0 {
                self.mean = value;
            } else {
                let n = self.count as f64;
                let n1 = n + 1.0;
                self.mean = self.mean * n / n1 + value / n1;
            }
            self.count += 1;
        }
        self.mean
    }

    /// Current mean; 0 when no finite sample has been added.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Number of finite samples consumed.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.mean = 0.0;
        self.count = 0;
    }

    /// Mean of the finite values in `values` (0 for an empty slice).
    pub fn calculate(values: &[f64]) -> f64 {
        values.iter().copied().collect::<Self>().mean()
    }
}

impl Extend<f64> for CumulativeAverage {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for CumulativeAverage {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut average = Self::new();
        average.extend(iter);
        average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average() {
        let average = CumulativeAverage::new();
        assert_eq!(average.mean(), 0.0);
        assert_eq!(average.count(), 0);
        assert_eq!(CumulativeAverage::calculate(&[]), 0.0);
    }

    #[test]
    fn test_running_mean() {
        let mut average = CumulativeAverage::new();
        assert_eq!(average.add(2.0), 2.0);
        assert_eq!(average.add(4.0), 3.0);
        assert!((average.add(9.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut average: CumulativeAverage = [1.0, 2.0, 3.0].into_iter().collect();
        average.clear();
        assert_eq!(average, CumulativeAverage::new());
    }
}
