//! Running statistics accumulator

use serde::Serialize;

/// Accumulates samples and reports running statistics.
///
/// Derived quantities of an empty accumulator are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistic {
    n: usize,
    value: f64,
    sum: f64,
    abs_sum: f64,
    sum_squares: f64,
    min: f64,
    max: f64,
}

impl Statistic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample.
    pub fn sigma(&mut self, x: f64) {
        if self.n == 0 {
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        self.n += 1;
        self.value = x;
        self.sum += x;
        self.abs_sum += x.abs();
        self.sum_squares += x * x;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Most recent sample
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn abs_sum(&self) -> f64 {
        self.abs_sum
    }

    pub fn sum_squares(&self) -> f64 {
        self.sum_squares
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        match self.n {
            0 => 0.0,
            n => self.sum / n as f64,
        }
    }

    pub fn abs_mean(&self) -> f64 {
        match self.n {
            0 => 0.0,
            n => self.abs_sum / n as f64,
        }
    }

    /// Sample variance (n - 1 denominator)
    pub fn variance(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let n = self.n as f64;
        ((self.sum_squares - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Root mean square
    pub fn rms(&self) -> f64 {
        match self.n {
            0 => 0.0,
            n => (self.sum_squares / n as f64).sqrt(),
        }
    }
}
