//! Render sinks
//!
//! A sink receives the spring's current value once per frame and redraws
//! whatever depends on it.

/// Receiver of per-frame values
pub trait RenderSink {
    fn render(&mut self, value: f64);
}

impl<F: FnMut(f64)> RenderSink for F {
    fn render(&mut self, value: f64) {
        self(value)
    }
}

impl RenderSink for () {
    fn render(&mut self, _value: f64) {}
}

/// Sink that records every rendered value
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    values: Vec<f64>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Largest rendered value, if any
    pub fn peak(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl RenderSink for Trajectory {
    fn render(&mut self, value: f64) {
        self.values.push(value);
    }
}
