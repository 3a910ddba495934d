/// Mean and sample standard deviation of one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStat {
    pub mean: f64,
    pub std_dev: f64,
}

/// Fixed-size rolling window over a value stream.
///
/// Yields nothing until `size` values have been pushed; positions before the
/// first full window stay undefined rather than zero-filled.
#[derive(Debug)]
pub struct RollingWindow {
    size: usize,
    values: Vec<f64>,
}

impl RollingWindow {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: Vec::with_capacity(size),
        }
    }

    /// Push one value; returns the window statistic once the window is full.
    pub fn add(&mut self, value: f64) -> Option<WindowStat> {
        self.values.push(value);
        if self.values.len() > self.size {
            self.values.remove(0);
        }
        if self.values.len() < self.size {
            return None;
        }

        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;

        // Sample variance, n - 1 in the denominator
        let variance = self
            .values
            .iter()
            .map(|&x| (x - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);

        Some(WindowStat {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}
