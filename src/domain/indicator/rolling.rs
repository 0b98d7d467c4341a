//! Incremental fixed-window accumulator shared by the rolling indicators.
//!
//! Keeps a running sum and sum of squares of `x - shift`, where `shift` is the
//! first observation. Shifting keeps the squares small for price-like data, so
//! the `E[x²] - E[x]²` variance does not lose precision; the result is still
//! clamped at zero to absorb residual rounding.

#[derive(Debug, Clone)]
pub struct RollingWindow {
    period: usize,
    shift: f64,
    sum: f64,
    sum_sq: f64,
}

impl RollingWindow {
    pub fn new(period: usize) -> Self {
        RollingWindow {
            period,
            shift: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Advance to index `i` of `values`, evicting `values[i - period]` once full.
    pub fn advance(&mut self, values: &[f64], i: usize) {
        if i == 0 {
            self.shift = values[0];
        }
        let x = values[i] - self.shift;
        self.sum += x;
        self.sum_sq += x * x;
        if i >= self.period {
            let y = values[i - self.period] - self.shift;
            self.sum -= y;
            self.sum_sq -= y * y;
        }
    }

    pub fn mean(&self) -> f64 {
        self.shift + self.sum / self.period as f64
    }

    pub fn population_stddev(&self) -> f64 {
        let n = self.period as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }
}

/// Apply `f` to every full window of `values`; earlier indices map to `None`.
///
/// A zero period or one longer than the input produces all `None`.
pub fn map_windows<T>(
    values: &[f64],
    period: usize,
    mut f: impl FnMut(&RollingWindow) -> T,
) -> Vec<Option<T>> {
    if period == 0 || period > values.len() {
        return values.iter().map(|_| None).collect();
    }

    let mut window = RollingWindow::new(period);
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        window.advance(values, i);
        if i + 1 >= period {
            out.push(Some(f(&window)));
        } else {
            out.push(None);
        }
    }
    out
}
