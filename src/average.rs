use heapless::HistoryBuffer;

/// Sliding-window mean over the last `N` samples.
///
/// Once full, every new sample evicts the oldest one.
pub struct RollingAverage<const N: usize> {
    samples: HistoryBuffer<f32, N>,
}

impl<const N: usize> RollingAverage<N> {
    pub fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    pub fn push(&mut self, sample: f32) {
        self.samples.write(sample);
    }

    /// Mean of the retained samples, or `None` when there are none.
    /// An empty window must never feed a threshold decision.
    pub fn mean(&self) -> Option<f32> {
        let count = self.samples.len();
        if count == 0 {
            return None;
        }
        let sum: f32 = self.samples.as_slice().iter().sum();
        Some(sum / count as f32)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }
}

impl<const N: usize> Default for RollingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}
