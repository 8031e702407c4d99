/// Running count, sum and sum of squares over a series.
///
/// Means and variances are taken over every pushed value, NaN included, so a
/// single non-finite input poisons the result the same way a plain arithmetic
/// mean would.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MomentAccumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl MomentAccumulator {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        self.sum_sq += x * x;
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean, NaN when nothing was pushed.
    #[inline(always)]
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Population variance `E[x^2] - E[x]^2`.
    #[inline(always)]
    pub fn variance(&self) -> f64 {
        let m = self.mean();
        self.sum_sq / self.count as f64 - m * m
    }
}

impl Extend<f64> for MomentAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for MomentAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}
